//! Shared data types for the generator crates.

pub mod diagnostic;
pub mod options;
pub mod record;
pub mod settings;

pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use options::{
    CleanupOptions, GeneratorOptions, Job, OutputFormat, SubstitutionOptions, placeholder,
};
pub use record::Record;
pub use settings::{Settings, SettingsError};
