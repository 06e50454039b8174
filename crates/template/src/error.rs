use slagen_document::DocumentError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to access template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed template: {0}")]
    Document(#[from] DocumentError),

    #[error("Invalid placeholder pattern: {0}")]
    Pattern(#[from] regex::Error),
}
