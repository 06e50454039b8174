//! The optional 1-based first/last row filter.
//!
//! Bounds come straight from user input. A bound that does not parse as an
//! integer is ignored with a warning, which is a recoverable condition.

use log::{debug, warn};
use std::ops::Range;

/// Result of resolving user-supplied row bounds against a record count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRange {
    /// Index range into the record list.
    pub indices: Range<usize>,
    /// Human readable notes about bounds that were ignored.
    pub warnings: Vec<String>,
}

impl RowRange {
    pub fn is_full(&self, len: usize) -> bool {
        self.indices == (0..len)
    }
}

/// Resolves `first`/`last` (1-based, inclusive) against `len` records.
///
/// `first` is clamped to at least 1 and `last` to at most `len`. When the
/// bounds cross, the full range is used.
pub fn resolve_range(len: usize, first: Option<&str>, last: Option<&str>) -> RowRange {
    let mut warnings = Vec::new();

    let first_item = match parse_bound(first, "first", &mut warnings) {
        Some(n) => n.max(1) as usize,
        None => 1,
    };
    let last_item = match parse_bound(last, "last", &mut warnings) {
        Some(n) => n.clamp(0, len as i64) as usize,
        None => len,
    };

    if first_item > last_item {
        if len > 0 {
            let message = format!(
                "Row range {}-{} is empty, using the full data range instead.",
                first_item, last_item
            );
            warn!("{}", message);
            warnings.push(message);
        }
        return RowRange {
            indices: 0..len,
            warnings,
        };
    }

    let indices = (first_item - 1)..last_item;
    if indices != (0..len) {
        debug!("Custom data range is: {} - {}", first_item, last_item);
    } else {
        debug!("Full data range will be used.");
    }
    RowRange { indices, warnings }
}

fn parse_bound(raw: Option<&str>, which: &str, warnings: &mut Vec<String>) -> Option<i64> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    match raw.parse::<i64>() {
        Ok(n) => Some(n),
        Err(_) => {
            let message = format!(
                "Could not parse value '{}' of \"{} row\" as an integer, using default value instead.",
                raw, which
            );
            warn!("{}", message);
            warnings.push(message);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_bounds_is_full_range() {
        let range = resolve_range(5, None, Some("  "));
        assert_eq!(range.indices, 0..5);
        assert!(range.is_full(5));
        assert!(range.warnings.is_empty());
    }

    #[test]
    fn test_bounds_are_one_based_and_inclusive() {
        assert_eq!(resolve_range(5, Some("2"), Some("4")).indices, 1..4);
        assert_eq!(resolve_range(5, Some("3"), None).indices, 2..5);
    }

    #[test]
    fn test_bounds_are_clamped() {
        assert_eq!(resolve_range(5, Some("-3"), Some("99")).indices, 0..5);
        assert_eq!(resolve_range(5, Some("0"), Some("1")).indices, 0..1);
    }

    #[test]
    fn test_non_numeric_bound_falls_back_with_warning() {
        let range = resolve_range(4, Some("two"), Some("3"));
        assert_eq!(range.indices, 0..3);
        assert_eq!(range.warnings.len(), 1);
        assert!(range.warnings[0].contains("first row"));
    }

    #[test]
    fn test_crossed_bounds_fall_back_to_full_range() {
        let range = resolve_range(4, Some("4"), Some("2"));
        assert_eq!(range.indices, 0..4);
        assert_eq!(range.warnings.len(), 1);
    }
}
