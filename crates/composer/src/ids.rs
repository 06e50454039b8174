//! Page object identifiers.

use slagen_document::Element;
use slagen_document::scribus::attr;

/// Hands out `ItemID` values that do not occur in the merged document.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: i64,
}

impl IdAllocator {
    /// Starts above every `ItemID` found under `root`.
    pub fn after_document(root: &Element) -> Self {
        let max = std::iter::once(root)
            .chain(root.descendants())
            .filter_map(item_id)
            .max()
            .unwrap_or(0);
        Self { next: max + 1 }
    }

    pub fn allocate(&mut self) -> i64 {
        let id = self.next;
        self.next += 1;
        id
    }

    pub fn peek(&self) -> i64 {
        self.next
    }
}

/// The numeric `ItemID` of an element, if it has a readable one.
pub fn item_id(element: &Element) -> Option<i64> {
    element.attr_i64(attr::ITEM_ID).ok().flatten()
}
