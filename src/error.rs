// src/error.rs
use slagen_core::GeneratorError;
use slagen_core::template::TemplateError;
use thiserror::Error;

/// Errors of the command line front end.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Generator(#[from] GeneratorError),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{failed} of {total} template(s) failed")]
    BatchFailed { failed: usize, total: usize },
}
