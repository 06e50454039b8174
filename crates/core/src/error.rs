//! Defines the error taxonomy of a generation run.

use slagen_composer::ComposerError;
use slagen_document::DocumentError;
use slagen_source::SourceError;
use slagen_template::TemplateError;
use slagen_traits::ExportError;
use slagen_types::SettingsError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Broad classes of failure, used to pick the advice shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    DataSource,
    TemplateNotFound,
    SubstitutionReference,
    ValueMismatch,
    Configuration,
    Internal,
}

impl ErrorCategory {
    pub fn guidance(&self) -> &'static str {
        match self {
            ErrorCategory::DataSource => "Check that the data file exists and holds a header line and at least one line of data.",
            ErrorCategory::TemplateNotFound => "Check the template path.",
            ErrorCategory::SubstitutionReference => "Check the placeholders and attribute references of the template.",
            ErrorCategory::ValueMismatch => "Please check whether the data file is consistent and the delimiter is set correctly.",
            ErrorCategory::Configuration => "Check the command line options and stored settings.",
            ErrorCategory::Internal => "Something went wrong while generating. Run with --verbose for details.",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::DataSource => "data source",
            ErrorCategory::TemplateNotFound => "template not found",
            ErrorCategory::SubstitutionReference => "substitution reference",
            ErrorCategory::ValueMismatch => "value mismatch",
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::Internal => "internal",
        };
        f.write_str(name)
    }
}

/// The main error enum of a generation run.
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Data source error: {0}")]
    DataSource(SourceError),
    #[error("Template not found: {0}")]
    TemplateNotFound(PathBuf),
    #[error("Malformed template: {0}")]
    Template(String),
    #[error("Unresolved substitution reference: {0}")]
    SubstitutionReference(String),
    #[error("Data does not match the template: {0}")]
    ValueMismatch(String),
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GeneratorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GeneratorError::DataSource(_) => ErrorCategory::DataSource,
            GeneratorError::TemplateNotFound(_) => ErrorCategory::TemplateNotFound,
            GeneratorError::SubstitutionReference(_) => ErrorCategory::SubstitutionReference,
            GeneratorError::ValueMismatch(_) => ErrorCategory::ValueMismatch,
            GeneratorError::Config(_) | GeneratorError::Settings(_) => ErrorCategory::Configuration,
            GeneratorError::Template(_)
            | GeneratorError::Export(_)
            | GeneratorError::Io(_)
            | GeneratorError::Internal(_) => ErrorCategory::Internal,
        }
    }
}

impl From<SourceError> for GeneratorError {
    fn from(e: SourceError) -> Self {
        match e {
            SourceError::FieldCountMismatch { .. } => GeneratorError::ValueMismatch(e.to_string()),
            other => GeneratorError::DataSource(other),
        }
    }
}

impl From<TemplateError> for GeneratorError {
    fn from(e: TemplateError) -> Self {
        match e {
            TemplateError::NotFound(path) => GeneratorError::TemplateNotFound(path),
            TemplateError::Io { path, source } => {
                log::error!("Cannot read template {}: {}", path.display(), source);
                GeneratorError::TemplateNotFound(path)
            }
            TemplateError::Document(e) => e.into(),
            TemplateError::Pattern(e) => GeneratorError::SubstitutionReference(e.to_string()),
        }
    }
}

impl From<DocumentError> for GeneratorError {
    fn from(e: DocumentError) -> Self {
        match e {
            DocumentError::Io(e) => GeneratorError::Io(e),
            DocumentError::Write(_) | DocumentError::Utf8(_) => GeneratorError::Internal(e.to_string()),
            other => GeneratorError::Template(other.to_string()),
        }
    }
}

impl From<ComposerError> for GeneratorError {
    fn from(e: ComposerError) -> Self {
        match e {
            ComposerError::Document(e) => e.into(),
            ComposerError::MissingAttribute { .. } => GeneratorError::Template(e.to_string()),
            ComposerError::Other(message) => GeneratorError::Internal(message),
        }
    }
}
