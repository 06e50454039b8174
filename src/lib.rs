//! # slagen
//!
//! Data-driven document generation for Scribus `.sla` templates.
//!
//! Placeholders written as `%VAR_<field>%` in a template are replaced by the
//! fields of each record of a CSV or JSON data file. Every record (or group
//! of records, see `%SG_NEXT-RECORD%`) yields one document, or all of them
//! are stacked into a single merged document.
//!
//! The work happens in the member crates; this crate re-exports them and
//! holds the batch and inventory logic of the command line tool.

pub mod batch;
pub mod error;
pub mod inventory;

pub use slagen_composer as composer;
pub use slagen_document as document;
pub use slagen_source as source;
pub use slagen_template as template;
pub use slagen_traits as traits;
pub use slagen_types as types;

pub use batch::{BatchSummary, JobOverrides, JobStatus, build_job, run_batch};
pub use error::CliError;
pub use inventory::Inventory;
pub use slagen_core::{
    ErrorCategory, GenerationReport, Generator, GeneratorError, GeneratorOptions, Job, OutputFormat,
    Settings,
};
