use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Data file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read data file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported text encoding '{0}'")]
    UnsupportedEncoding(String),

    #[error("Data file is not valid {encoding}: {message}")]
    Decode { encoding: String, message: String },

    #[error("Malformed data at line {line}: {message}")]
    Malformed { line: usize, message: String },

    #[error("Malformed JSON data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Row at line {line} has {found} fields but the header has {expected}")]
    FieldCountMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error(
        "Data file {0} has only one line or is empty. At least a header line and a line of data is needed"
    )]
    NotEnoughRows(PathBuf),
}
