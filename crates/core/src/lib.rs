//! # slagen-core
//!
//! Generation runs for layout templates.
//!
//! A run reads the records of a data file, substitutes them unit by unit
//! into a template and writes the results:
//! - **generator**: the run itself, one document per unit or one merged document
//! - **naming**: output file names from counters or name patterns
//! - **output**: writing generated documents
//! - **settings**: run settings stored inside a template
//! - **export**: PDF export through a [`HostApplication`]
//! - **error**: the error taxonomy of a run
//!
//! ## Example
//!
//! ```ignore
//! use slagen_core::{Generator, GeneratorOptions, Job};
//!
//! let mut job = Job::new("cards.sla", "cards.csv");
//! job.single_output = true;
//! let report = Generator::new(GeneratorOptions::default()).run(&job)?;
//! ```

// Re-export foundation crates
pub use slagen_traits as traits;
pub use slagen_types as types;

// Re-export algorithm crates
pub use slagen_composer as composer;
pub use slagen_document as document;
pub use slagen_source as source;
pub use slagen_template as template;

pub mod error;
pub mod export;
pub mod generator;
pub mod naming;
pub mod output;
pub mod settings;

pub use error::{ErrorCategory, GeneratorError};
pub use export::export_documents;
pub use generator::{GenerationReport, Generator};
pub use settings::{load_settings, load_settings_from_file, store_settings, store_settings_in_file};
pub use slagen_traits::HostApplication;
pub use slagen_types::{GeneratorOptions, Job, OutputFormat, Settings};
