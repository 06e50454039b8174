//! Document composition for generated layouts.
//!
//! This crate works on substituted fragments:
//! - Merging fragments into one document (page stacking, renumbering, relinking)
//! - Removing text runs emptied by placeholder cleaning

pub mod cleanup;
mod error;
pub mod ids;
pub mod merge;

pub use cleanup::{CleanupReport, remove_empty_texts};
pub use error::ComposerError;
pub use ids::IdAllocator;
pub use merge::{MergeBuffer, MergedDocument, UnitGeometry};

use slagen_document::Document;

/// Merges `fragments` in order. Returns `None` when there are none.
pub fn merge_fragments<I>(fragments: I, contribution: &str) -> Result<Option<MergedDocument>, ComposerError>
where
    I: IntoIterator<Item = Document>,
{
    let mut fragments = fragments.into_iter();
    let Some(seed) = fragments.next() else {
        return Ok(None);
    };
    let mut buffer = MergeBuffer::new(seed, contribution)?;
    for fragment in fragments {
        buffer.append(fragment)?;
    }
    buffer.finish().map(Some)
}
