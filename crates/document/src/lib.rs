//! Layout documents as an owned element tree.
//!
//! `slagen-document` reads `.sla` XML into a mutable [`Element`] tree with
//! `roxmltree`, writes it back with `quick-xml`, names the parts of the
//! Scribus vocabulary the generator touches, and evaluates the small
//! relative path language used by attribute carriers.

pub mod error;
pub mod node;
pub mod parse;
pub mod path;
pub mod scribus;
pub mod write;

pub use error::{DocumentError, PathError};
pub use node::{Attribute, Element, ElementPath, Node};
pub use scribus::VersionFamily;

use log::debug;
use std::path::Path;

/// A parsed layout document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub root: Element,
}

impl Document {
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        parse::parse_document(text)
    }

    pub fn from_file(path: &Path) -> Result<Self, DocumentError> {
        let text = std::fs::read_to_string(path)?;
        debug!("read {} ({} bytes)", path.display(), text.len());
        Self::parse(&text)
    }

    /// Serializes to a string, optionally indented.
    pub fn to_xml(&self, indent: bool) -> Result<String, DocumentError> {
        let mut buf = Vec::new();
        write::write_document(self, &mut buf, indent)?;
        Ok(String::from_utf8(buf)?)
    }

    pub fn write_file(&self, path: &Path, indent: bool) -> Result<(), DocumentError> {
        let file = std::fs::File::create(path)?;
        let mut out = std::io::BufWriter::new(file);
        write::write_document(self, &mut out, indent)?;
        std::io::Write::flush(&mut out)?;
        debug!("wrote layout {}", path.display());
        Ok(())
    }

    /// The root `Version` attribute, empty when absent.
    pub fn version(&self) -> &str {
        self.root.attr(scribus::attr::VERSION).unwrap_or("")
    }

    pub fn family(&self) -> VersionFamily {
        VersionFamily::from_version(self.version())
    }

    /// Child index of the `DOCUMENT` element under the root.
    pub fn document_index(&self) -> Result<usize, DocumentError> {
        self.root
            .position_of_child(scribus::tag::DOCUMENT)
            .ok_or_else(|| DocumentError::MissingElement(scribus::tag::DOCUMENT.to_string()))
    }

    /// The `DOCUMENT` properties element.
    pub fn properties(&self) -> Result<&Element, DocumentError> {
        self.root
            .find_child(scribus::tag::DOCUMENT)
            .ok_or_else(|| DocumentError::MissingElement(scribus::tag::DOCUMENT.to_string()))
    }

    pub fn properties_mut(&mut self) -> Result<&mut Element, DocumentError> {
        self.root
            .find_child_mut(scribus::tag::DOCUMENT)
            .ok_or_else(|| DocumentError::MissingElement(scribus::tag::DOCUMENT.to_string()))
    }
}
