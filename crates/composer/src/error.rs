use slagen_document::DocumentError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComposerError {
    #[error("Layout document error: {0}")]
    Document(#[from] DocumentError),

    #[error("<{element}> is missing the {attribute} attribute needed for merging")]
    MissingAttribute { element: String, attribute: String },

    #[error("{0}")]
    Other(String),
}
