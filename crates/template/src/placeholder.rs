//! The placeholder substitution engine.
//!
//! Replaces `%VAR_<field>%` tokens with field values from the records of one
//! output unit. Records are consumed in order: every next-record marker moves
//! the cursor to the following record, and once the records run out the
//! remaining tokens are left for cleaning instead of being filled with stale
//! data.
//!
//! Three entry points share the same token handling:
//!
//! - [`PlaceholderEngine::substitute_document`] walks a parsed document in
//!   document order and substitutes attribute values and text. Values are
//!   stored raw; the serializer escapes them.
//! - [`PlaceholderEngine::substitute_lines`] works on serialized XML text line
//!   by line. Values are escaped before insertion.
//! - [`PlaceholderEngine::substitute_plain`] substitutes plain text such as an
//!   output name pattern.

use crate::error::TemplateError;
use log::{debug, warn};
use regex::{Captures, Regex};
use slagen_document::scribus::{attr, tag};
use slagen_document::{Document, Element, Node};
use slagen_types::options::{PLACEHOLDER_PREFIX, PLACEHOLDER_SUFFIX};
use slagen_types::{Record, SubstitutionOptions, placeholder};

/// Counters collected while substituting one unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubstitutionStats {
    /// Tokens replaced by a field value.
    pub replaced: usize,
    /// Unmatched tokens removed by cleaning.
    pub cleaned: usize,
    /// Next-record markers encountered.
    pub markers: usize,
    /// Text runs split at tabs or line breaks.
    pub split_runs: usize,
}

impl std::ops::AddAssign for SubstitutionStats {
    fn add_assign(&mut self, other: Self) {
        self.replaced += other.replaced;
        self.cleaned += other.cleaned;
        self.markers += other.markers;
        self.split_runs += other.split_runs;
    }
}

/// Position in the records buffered for one unit.
#[derive(Debug, Clone)]
pub struct RecordCursor<'a> {
    records: &'a [Record],
    index: usize,
}

impl<'a> RecordCursor<'a> {
    pub fn new(records: &'a [Record]) -> Self {
        Self { records, index: 0 }
    }

    /// The record in scope, or `None` once the markers outnumber the records.
    pub fn current(&self) -> Option<&'a Record> {
        self.records.get(self.index)
    }

    pub fn advance(&mut self) {
        self.index += 1;
        if self.index < self.records.len() {
            debug!("loading next record");
        } else {
            debug!("next record reached last data entry");
        }
    }

    pub fn position(&self) -> usize {
        self.index
    }
}

/// How a field value is prepared before insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueStyle {
    /// Into a parsed tree: raw text.
    Tree,
    /// Into serialized XML: markup characters escaped.
    Markup,
    /// Into plain text: control characters flattened.
    Plain,
}

pub struct PlaceholderEngine {
    options: SubstitutionOptions,
    /// Alternation of all known tokens, longest first. `None` without fields.
    tokens: Option<Regex>,
    unused: Regex,
    marker_residue: Option<Regex>,
    color_line: Regex,
    text_run: Regex,
    control_run: Regex,
    protected_script: Option<String>,
}

impl PlaceholderEngine {
    /// Builds an engine for the given field names.
    pub fn new<I, S>(fields: I, options: SubstitutionOptions) -> Result<Self, TemplateError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names: Vec<String> = fields
            .into_iter()
            .map(|f| f.as_ref().to_string())
            .filter(|f| !f.is_empty())
            .collect();
        names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        names.dedup();

        let tokens = if names.is_empty() {
            None
        } else {
            let alternation = names
                .iter()
                .map(|name| regex::escape(&placeholder(name)))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&alternation)?)
        };

        let token = format!(
            r"{}\w*{}",
            regex::escape(PLACEHOLDER_PREFIX),
            regex::escape(PLACEHOLDER_SUFFIX)
        );
        let unused = if options.remove_cleaned_prefix {
            Regex::new(&format!(r"\s*[,;-]*\s*{}\s*", token))?
        } else {
            Regex::new(&format!(r"\s*{}\s*", token))?
        };
        let marker_residue = if options.next_record_marker.is_empty() {
            None
        } else {
            Some(Regex::new(&format!(
                r"\s*{}\w*\s*",
                regex::escape(&options.next_record_marker)
            ))?)
        };

        Ok(Self {
            options,
            tokens,
            unused,
            marker_residue,
            color_line: Regex::new(r"<COLOR\s")?,
            text_run: Regex::new(r#"(?s)(<ITEXT.* CH=")([^"]+)(".*/>)"#)?,
            control_run: Regex::new(r"[\t\n]+")?,
            protected_script: None,
        })
    }

    /// Leaves the script element with this `NAME` untouched.
    pub fn protect_script(mut self, name: impl Into<String>) -> Self {
        self.protected_script = Some(name.into());
        self
    }

    pub fn options(&self) -> &SubstitutionOptions {
        &self.options
    }

    /// Substitutes `records` into `document` in place.
    pub fn substitute_document(&self, document: &mut Document, records: &[Record]) -> SubstitutionStats {
        let mut cursor = RecordCursor::new(records);
        let mut stats = SubstitutionStats::default();
        self.substitute_element(&mut document.root, &mut cursor, &mut stats);
        debug!(
            "substituted {} placeholders, cleaned {}, {} next-record markers",
            stats.replaced, stats.cleaned, stats.markers
        );
        stats
    }

    fn substitute_element(&self, element: &mut Element, cursor: &mut RecordCursor<'_>, stats: &mut SubstitutionStats) {
        if !self.is_protected(element) {
            let markers: usize = element
                .attributes
                .iter()
                .map(|a| self.count_markers(&a.value))
                .sum();
            self.advance(cursor, markers, stats);

            let record = cursor.current();
            for attribute in &mut element.attributes {
                if let Some(value) = self.process(&attribute.value, record, ValueStyle::Tree, stats) {
                    attribute.value = value;
                }
            }
        }

        let children = std::mem::take(&mut element.children);
        let mut substituted = Vec::with_capacity(children.len());
        for child in children {
            match child {
                Node::Element(mut e) => {
                    self.substitute_element(&mut e, cursor, stats);
                    if self.options.keep_tabs_and_linebreaks && needs_split(&e) {
                        stats.split_runs += 1;
                        substituted.extend(split_text_run(&e));
                    } else {
                        substituted.push(Node::Element(e));
                    }
                }
                Node::Text(text) => {
                    self.advance(cursor, self.count_markers(&text), stats);
                    let text = self
                        .process(&text, cursor.current(), ValueStyle::Tree, stats)
                        .unwrap_or(text);
                    substituted.push(Node::Text(text));
                }
            }
        }
        element.children = substituted;
    }

    /// Substitutes serialized XML line by line.
    ///
    /// Color declarations are never substituted. A line holding the marker
    /// advances to the next record before its own tokens are replaced.
    pub fn substitute_lines(&self, text: &str, records: &[Record]) -> (String, SubstitutionStats) {
        let mut cursor = RecordCursor::new(records);
        let mut stats = SubstitutionStats::default();
        let lines: Vec<String> = text
            .split('\n')
            .map(|line| self.substitute_line(line, &mut cursor, &mut stats))
            .collect();
        (lines.join("\n"), stats)
    }

    fn substitute_line(&self, line: &str, cursor: &mut RecordCursor<'_>, stats: &mut SubstitutionStats) -> String {
        if !self.mentions_token(line) || self.color_line.is_match(line) {
            return line.to_string();
        }
        if self.count_markers(line) > 0 {
            self.advance(cursor, 1, stats);
        }

        let mut line = self
            .process(line, cursor.current(), ValueStyle::Markup, stats)
            .unwrap_or_else(|| line.to_string());

        if self.options.keep_tabs_and_linebreaks && line.contains(['\t', '\n']) {
            match self.text_run.captures(&line) {
                Some(caps) => {
                    let begin = caps[1].to_string();
                    let end = caps[3].to_string();
                    let split = self
                        .control_run
                        .replace_all(&line, |c: &Captures| format!("{}{}{}", end, &c[0], begin))
                        .replace('\t', "<tab />")
                        .replace('\n', "<breakline />");
                    stats.split_runs += 1;
                    line = split;
                }
                None => warn!("could not convert tabs and linebreaks in this line: {}", line),
            }
        }
        line
    }

    /// Substitutes plain text, e.g. an output name pattern.
    pub fn substitute_plain(&self, text: &str, records: &[Record]) -> String {
        let mut cursor = RecordCursor::new(records);
        let mut stats = SubstitutionStats::default();
        self.advance(&mut cursor, self.count_markers(text), &mut stats);
        self.process(text, cursor.current(), ValueStyle::Plain, &mut stats)
            .unwrap_or_else(|| text.to_string())
    }

    fn is_protected(&self, element: &Element) -> bool {
        if element.name == tag::COLOR {
            return true;
        }
        element.name == tag::JAVA
            && self
                .protected_script
                .as_deref()
                .is_some_and(|name| element.attr(attr::SCRIPT_NAME) == Some(name))
    }

    fn mentions_token(&self, text: &str) -> bool {
        text.contains(PLACEHOLDER_PREFIX) || self.count_markers(text) > 0
    }

    fn count_markers(&self, text: &str) -> usize {
        let marker = self.options.next_record_marker.as_str();
        if marker.is_empty() {
            0
        } else {
            text.matches(marker).count()
        }
    }

    fn advance(&self, cursor: &mut RecordCursor<'_>, markers: usize, stats: &mut SubstitutionStats) {
        for _ in 0..markers {
            cursor.advance();
        }
        stats.markers += markers;
    }

    /// Replaces and cleans tokens in one string. Returns `None` when nothing changed.
    fn process(
        &self,
        text: &str,
        record: Option<&Record>,
        style: ValueStyle,
        stats: &mut SubstitutionStats,
    ) -> Option<String> {
        if !self.mentions_token(text) {
            return None;
        }

        let mut result = match (&self.tokens, record) {
            (Some(tokens), Some(record)) => tokens
                .replace_all(text, |caps: &Captures| {
                    let token = &caps[0];
                    let name = &token[PLACEHOLDER_PREFIX.len()..token.len() - PLACEHOLDER_SUFFIX.len()];
                    match record.get(name) {
                        Some(value) => {
                            stats.replaced += 1;
                            self.prepare_value(value, style)
                        }
                        None => token.to_string(),
                    }
                })
                .into_owned(),
            _ => text.to_string(),
        };

        if self.options.clean_unused {
            let cleaned = self.unused.find_iter(&result).count();
            if cleaned > 0 {
                debug!("cleaned {} empty variable(s)", cleaned);
                stats.cleaned += cleaned;
                result = self.unused.replace_all(&result, "").into_owned();
            }
            if let Some(residue) = &self.marker_residue {
                result = residue.replace_all(&result, "").into_owned();
            }
        }

        (result != text).then_some(result)
    }

    fn prepare_value(&self, value: &str, style: ValueStyle) -> String {
        let value = xml_safe(&value.replace("\r\n", "\n").replace('\r', "\n"));
        let value = if style == ValueStyle::Plain || !self.options.keep_tabs_and_linebreaks {
            value.replace(['\t', '\n'], " ")
        } else {
            value
        };
        match style {
            ValueStyle::Markup => escape_markup(&value),
            ValueStyle::Tree | ValueStyle::Plain => value,
        }
    }
}

/// Vertical tabs and form feeds are in-cell line breaks in spreadsheet
/// exports. Other control characters cannot appear in XML 1.0 and are dropped.
fn xml_safe(value: &str) -> String {
    value
        .chars()
        .filter_map(|c| match c {
            '\u{0B}' | '\u{0C}' => Some('\n'),
            '\t' | '\n' => Some(c),
            c if (c as u32) < 0x20 => None,
            c => Some(c),
        })
        .collect()
}

/// The characters that break serialized XML when inserted raw.
fn escape_markup(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

fn needs_split(element: &Element) -> bool {
    element.name == tag::ITEXT
        && element
            .attr(attr::TEXT)
            .is_some_and(|text| text.contains(['\t', '\n']))
}

/// Splits a text run at tabs and line breaks into sibling runs separated by
/// `<tab/>` and `<breakline/>` elements. Empty runs are not emitted.
fn split_text_run(element: &Element) -> Vec<Node> {
    let text = element.attr(attr::TEXT).unwrap_or_default();
    let mut nodes = Vec::new();
    let mut segment = String::new();

    let flush = |segment: &mut String, nodes: &mut Vec<Node>| {
        if !segment.is_empty() {
            let mut run = element.clone();
            run.set_attr(attr::TEXT, std::mem::take(segment));
            nodes.push(Node::Element(run));
        }
    };

    for c in text.chars() {
        match c {
            '\t' | '\n' => {
                flush(&mut segment, &mut nodes);
                let marker = if c == '\t' { tag::TAB } else { tag::BREAKLINE };
                nodes.push(Node::Element(Element::new(marker)));
            }
            other => segment.push(other),
        }
    }
    flush(&mut segment, &mut nodes);
    nodes
}
