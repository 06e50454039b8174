//! HostApplication trait for fixed-layout export.
//!
//! The layout application owns rendering. The generator only needs to open a
//! generated document, ask how many pages it has, export a page list to a
//! file and close the document again.

use std::fmt::Debug;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for export operations.
#[derive(Error, Debug, Clone)]
pub enum ExportError {
    #[error("No document is open")]
    NoDocumentOpen,

    #[error("A document is already open: {0}")]
    AlreadyOpen(PathBuf),

    #[error("Failed to open '{path}': {message}")]
    OpenFailed { path: PathBuf, message: String },

    #[error("Failed to export '{path}': {message}")]
    ExportFailed { path: PathBuf, message: String },

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io(err.to_string())
    }
}

/// The export capability of a layout application.
///
/// One document is open at a time. Callers must close a document before
/// opening the next one.
///
/// # Example
///
/// ```ignore
/// host.open_document(Path::new("out/1.sla"))?;
/// let pages: Vec<usize> = (1..=host.page_count()?).collect();
/// host.export_pages(&pages, Path::new("out/1.pdf"))?;
/// host.close_document()?;
/// ```
pub trait HostApplication: Debug {
    /// Open a layout document.
    fn open_document(&mut self, path: &Path) -> Result<(), ExportError>;

    /// Number of pages in the open document.
    fn page_count(&self) -> Result<usize, ExportError>;

    /// Export the given 1-based pages of the open document to `output`.
    fn export_pages(&mut self, pages: &[usize], output: &Path) -> Result<(), ExportError>;

    /// Close the open document.
    fn close_document(&mut self) -> Result<(), ExportError>;

    /// Returns a human-readable name for this host (for logging/debugging).
    fn name(&self) -> &'static str;
}

/// One export performed by a [`RecordingHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRecord {
    pub source: PathBuf,
    pub pages: Vec<usize>,
    pub output: PathBuf,
}

/// A host that records exports instead of rendering.
///
/// Every opened document reports the configured page count. Exports are
/// kept in memory and can be inspected afterwards.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pages_per_document: usize,
    open: Option<PathBuf>,
    exports: Vec<ExportRecord>,
}

impl RecordingHost {
    pub fn new(pages_per_document: usize) -> Self {
        Self {
            pages_per_document,
            ..Default::default()
        }
    }

    pub fn exports(&self) -> &[ExportRecord] {
        &self.exports
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }
}

impl HostApplication for RecordingHost {
    fn open_document(&mut self, path: &Path) -> Result<(), ExportError> {
        if let Some(open) = &self.open {
            return Err(ExportError::AlreadyOpen(open.clone()));
        }
        if !path.exists() {
            return Err(ExportError::OpenFailed {
                path: path.to_path_buf(),
                message: "file does not exist".to_string(),
            });
        }
        self.open = Some(path.to_path_buf());
        Ok(())
    }

    fn page_count(&self) -> Result<usize, ExportError> {
        self.open
            .as_ref()
            .map(|_| self.pages_per_document)
            .ok_or(ExportError::NoDocumentOpen)
    }

    fn export_pages(&mut self, pages: &[usize], output: &Path) -> Result<(), ExportError> {
        let source = self.open.clone().ok_or(ExportError::NoDocumentOpen)?;
        if let Some(bad) = pages.iter().find(|&&p| p == 0 || p > self.pages_per_document) {
            return Err(ExportError::ExportFailed {
                path: output.to_path_buf(),
                message: format!("page {} out of range", bad),
            });
        }
        self.exports.push(ExportRecord {
            source,
            pages: pages.to_vec(),
            output: output.to_path_buf(),
        });
        Ok(())
    }

    fn close_document(&mut self) -> Result<(), ExportError> {
        self.open.take().map(|_| ()).ok_or(ExportError::NoDocumentOpen)
    }

    fn name(&self) -> &'static str {
        "RecordingHost"
    }
}
