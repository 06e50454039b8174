//! Writing generated documents.

use crate::error::GeneratorError;
use slagen_document::Document;
use std::path::{Path, PathBuf};

pub const LAYOUT_EXTENSION: &str = "sla";
pub const PDF_EXTENSION: &str = "pdf";

/// Writes `document` to `<dir>/<name>.sla`. A `/` in `name` places the file
/// in a subdirectory; missing directories are created.
pub fn write_document(document: &Document, dir: &Path, name: &str, indent: bool) -> Result<PathBuf, GeneratorError> {
    let path = dir.join(format!("{}.{}", name, LAYOUT_EXTENSION));
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    document.write_file(&path, indent)?;
    Ok(path)
}
