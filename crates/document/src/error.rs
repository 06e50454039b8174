use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("XML parse error: {0}")]
    Parse(#[from] roxmltree::Error),

    #[error("XML write error: {0}")]
    Write(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialized document is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Missing <{0}> element")]
    MissingElement(String),

    #[error("Invalid value '{value}' for attribute {attribute} on <{element}>")]
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Path parse error in '{0}': {1}")]
    Parse(String, String),
}
