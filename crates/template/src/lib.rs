//! Templates and placeholder substitution.
//!
//! A [`Template`] is a parsed layout document with its attribute carriers
//! already applied. Every output unit substitutes records into a fresh copy
//! of it with a [`PlaceholderEngine`].

pub mod error;
pub mod migrate;
pub mod overwrite;
pub mod placeholder;

pub use error::TemplateError;
pub use migrate::{Migration, MigrationReport, migrate_file};
pub use overwrite::apply_attribute_overwrites;
pub use placeholder::{PlaceholderEngine, RecordCursor, SubstitutionStats};

use log::info;
use regex::Regex;
use slagen_document::scribus::{attr, tag};
use slagen_document::{Document, Element, Node};
use slagen_types::Diagnostic;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%VAR_(\w+)%").expect("BUG: invalid PLACEHOLDER_RE regex literal")
});

/// What kind of content references a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderKind {
    Text,
    Image,
    Attribute,
}

impl fmt::Display for PlaceholderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PlaceholderKind::Text => "text",
            PlaceholderKind::Image => "image",
            PlaceholderKind::Attribute => "attribute",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlaceholderUse {
    pub name: String,
    pub kind: PlaceholderKind,
}

#[derive(Debug, Clone)]
pub struct Template {
    path: Option<PathBuf>,
    document: Document,
    records_per_unit: usize,
    diagnostics: Vec<Diagnostic>,
}

impl Template {
    /// Reads and prepares the template at `path`.
    pub fn load(path: &Path, marker: &str) -> Result<Self, TemplateError> {
        if !path.is_file() {
            return Err(TemplateError::NotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut template = Self::from_document(Document::parse(&text)?, marker);
        template.path = Some(path.to_path_buf());
        info!(
            "loaded template {} ({} record(s) per unit)",
            path.display(),
            template.records_per_unit
        );
        Ok(template)
    }

    pub fn parse(text: &str, marker: &str) -> Result<Self, TemplateError> {
        Ok(Self::from_document(Document::parse(text)?, marker))
    }

    /// Counts next-record markers, then applies the attribute carriers.
    pub fn from_document(mut document: Document, marker: &str) -> Self {
        let markers = if marker.is_empty() {
            0
        } else {
            count_occurrences(&document.root, marker)
        };
        let diagnostics = apply_attribute_overwrites(&mut document);
        Self {
            path: None,
            document,
            records_per_unit: markers + 1,
            diagnostics,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Records consumed by one output unit.
    pub fn records_per_unit(&self) -> usize {
        self.records_per_unit
    }

    /// Problems found while applying attribute carriers.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// An independent copy to substitute one unit into.
    pub fn fragment(&self) -> Document {
        self.document.clone()
    }

    /// Distinct placeholders in document order, each with the kind of
    /// content that references it. Colors are not inspected.
    pub fn placeholders(&self) -> Vec<PlaceholderUse> {
        let mut seen = HashSet::new();
        let mut uses = Vec::new();
        collect_placeholders(&self.document.root, &mut seen, &mut uses);
        uses
    }
}

fn count_occurrences(element: &Element, needle: &str) -> usize {
    let own: usize = element
        .attributes
        .iter()
        .map(|a| a.value.matches(needle).count())
        .sum();
    own + element
        .children
        .iter()
        .map(|child| match child {
            Node::Element(e) => count_occurrences(e, needle),
            Node::Text(t) => t.matches(needle).count(),
        })
        .sum::<usize>()
}

fn collect_placeholders(element: &Element, seen: &mut HashSet<PlaceholderUse>, uses: &mut Vec<PlaceholderUse>) {
    if element.name == tag::COLOR {
        return;
    }
    for attribute in &element.attributes {
        let kind = match (element.name.as_str(), attribute.name.as_str()) {
            (tag::ITEXT, attr::TEXT) => PlaceholderKind::Text,
            (_, attr::IMAGE_FILE) => PlaceholderKind::Image,
            _ => PlaceholderKind::Attribute,
        };
        record_placeholders(&attribute.value, kind, seen, uses);
    }
    for child in &element.children {
        match child {
            Node::Element(e) => collect_placeholders(e, seen, uses),
            Node::Text(t) => record_placeholders(t, PlaceholderKind::Text, seen, uses),
        }
    }
}

fn record_placeholders(
    text: &str,
    kind: PlaceholderKind,
    seen: &mut HashSet<PlaceholderUse>,
    uses: &mut Vec<PlaceholderUse>,
) {
    for caps in PLACEHOLDER_RE.captures_iter(text) {
        let found = PlaceholderUse {
            name: caps[1].to_string(),
            kind,
        };
        if seen.insert(found.clone()) {
            uses.push(found);
        }
    }
}
