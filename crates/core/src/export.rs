//! Fixed-layout export through the host application.

use crate::error::GeneratorError;
use crate::output::PDF_EXTENSION;
use log::{debug, info, warn};
use slagen_traits::{ExportError, HostApplication};
use std::path::{Path, PathBuf};

/// Exports every generated document to a PDF next to it.
///
/// Documents are handled one at a time: open, export all pages, close. The
/// document is closed even when the export fails. Unless `keep_layout` is
/// set, each layout document is deleted once its PDF exists.
pub fn export_documents(
    host: &mut dyn HostApplication,
    documents: &[PathBuf],
    keep_layout: bool,
) -> Result<Vec<PathBuf>, GeneratorError> {
    let mut exported = Vec::with_capacity(documents.len());
    for document in documents {
        let pdf = document.with_extension(PDF_EXTENSION);
        if let Some(dir) = pdf.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)?;
        }

        export_one(host, document, &pdf)?;
        info!("exported {} with {}", pdf.display(), host.name());

        if !keep_layout {
            std::fs::remove_file(document)?;
            debug!("removed {}", document.display());
        }
        exported.push(pdf);
    }
    Ok(exported)
}

fn export_one(host: &mut dyn HostApplication, document: &Path, pdf: &Path) -> Result<(), ExportError> {
    host.open_document(document)?;
    let result = host
        .page_count()
        .and_then(|count| {
            let pages: Vec<usize> = (1..=count).collect();
            host.export_pages(&pages, pdf)
        });
    let closed = host.close_document();
    if let Err(e) = &closed
        && result.is_err()
    {
        warn!("closing {} after a failed export: {}", document.display(), e);
    }
    result.and(closed)
}
