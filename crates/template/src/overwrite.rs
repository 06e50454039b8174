//! Attribute overwrites driven by carrier elements.
//!
//! A carrier is an `ItemAttribute` whose `Parameter` is `SGAttribute`. Its
//! `Name` and `Value` give the attribute to set, and `RelationshipTo` holds a
//! relative path to the elements that receive it. Paths are evaluated from the
//! page object enclosing the carrier:
//!
//! ```text
//! <PAGEOBJECT FONT="Arial">
//!   <StoryText>
//!     <ITEXT CH="%VAR_name%"/>
//!   </StoryText>
//!   <PageItemAttributes>
//!     <ItemAttribute Name="FONT" Value="%VAR_font%" Parameter="SGAttribute" RelationshipTo="//ITEXT"/>
//!   </PageItemAttributes>
//! </PAGEOBJECT>
//! ```
//!
//! An empty reference targets the page object itself. A reference starting
//! with `/` is read relative to the page object as well.

use log::{debug, error};
use slagen_document::path::{parse_path, select};
use slagen_document::scribus::{CARRIER_PARAMETER, attr, tag};
use slagen_document::{Document, Element, ElementPath};
use slagen_types::{Diagnostic, DiagnosticKind};

/// One overwrite instruction read from a carrier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Carrier {
    pub location: ElementPath,
    pub context: ElementPath,
    pub name: String,
    pub value: String,
    pub reference: String,
}

impl Carrier {
    /// The reference as evaluated against the context element.
    pub fn effective_reference(&self) -> String {
        if self.reference.is_empty() {
            ".".to_string()
        } else if self.reference.starts_with('/') {
            format!(".{}", self.reference)
        } else {
            self.reference.clone()
        }
    }
}

/// Collects the carriers of a document in document order.
pub fn find_carriers(root: &Element) -> Vec<Carrier> {
    root.descendant_paths(&[])
        .into_iter()
        .filter_map(|path| {
            let element = root.get_path(&path)?;
            if element.name != tag::ITEM_ATTRIBUTE || element.attr(attr::PARAMETER) != Some(CARRIER_PARAMETER) {
                return None;
            }
            Some(Carrier {
                context: carrier_context(root, &path),
                name: element.attr(attr::NAME).unwrap_or_default().to_string(),
                value: element.attr(attr::VALUE).unwrap_or_default().to_string(),
                reference: element.attr(attr::RELATIONSHIP_TO).unwrap_or_default().to_string(),
                location: path,
            })
        })
        .collect()
}

/// The nearest enclosing page object, falling back to the carrier's grandparent.
fn carrier_context(root: &Element, path: &[usize]) -> ElementPath {
    (0..path.len())
        .rev()
        .map(|len| &path[..len])
        .find(|prefix| root.get_path(prefix).is_some_and(|e| e.name == tag::PAGEOBJECT))
        .map(|prefix| prefix.to_vec())
        .unwrap_or_else(|| path[..path.len().saturating_sub(2)].to_vec())
}

/// Applies every carrier of `document` in order.
///
/// A carrier with a malformed reference, or one that designates nothing, is
/// skipped. Each skipped carrier yields a diagnostic.
pub fn apply_attribute_overwrites(document: &mut Document) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let carriers = find_carriers(&document.root);
    if !carriers.is_empty() {
        debug!("found {} attribute carrier(s)", carriers.len());
    }

    for carrier in carriers {
        if carrier.name.is_empty() {
            let message = format!("attribute carrier at {:?} has no attribute name", carrier.location);
            error!("{}", message);
            diagnostics.push(Diagnostic::new(DiagnosticKind::AttributePath, message));
            continue;
        }

        let reference = carrier.effective_reference();
        let path = match parse_path(&reference) {
            Ok(path) => path,
            Err(e) => {
                let message = format!("cannot overwrite attribute {}: {}", carrier.name, e);
                error!("{}", message);
                diagnostics.push(Diagnostic::new(DiagnosticKind::AttributePath, message));
                continue;
            }
        };

        let targets = select(&document.root, &carrier.context, &path);
        if targets.is_empty() {
            let message = format!(
                "cannot overwrite attribute {}: no element matches '{}'",
                carrier.name, carrier.reference
            );
            error!("{}", message);
            diagnostics.push(Diagnostic::new(DiagnosticKind::AttributeTarget, message));
            continue;
        }

        for target in &targets {
            if let Some(element) = document.root.get_path_mut(target) {
                element.set_attr(carrier.name.as_str(), carrier.value.as_str());
            }
        }
        debug!(
            "set {}=\"{}\" on {} element(s) via '{}'",
            carrier.name,
            carrier.value,
            targets.len(),
            reference
        );
    }
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn doc(carriers: &str) -> Document {
        Document::parse(&format!(
            r#"<SCRIBUSUTF8NEW Version="1.5.8"><DOCUMENT>
                <PAGEOBJECT ItemID="1" FONT="Arial">
                    <StoryText>
                        <ITEXT CH="a"/>
                        <para/>
                        <ITEXT CH="b" FONT="Times"/>
                    </StoryText>
                    <PageItemAttributes>{}</PageItemAttributes>
                </PAGEOBJECT>
                <PAGEOBJECT ItemID="2" FONT="Arial"/>
            </DOCUMENT></SCRIBUSUTF8NEW>"#,
            carriers
        ))
        .unwrap()
    }

    fn fonts(doc: &Document) -> Vec<Option<String>> {
        doc.root
            .descendants()
            .filter(|e| e.name == "PAGEOBJECT" || e.name == "ITEXT")
            .map(|e| e.attr("FONT").map(str::to_string))
            .collect()
    }

    fn carrier(name: &str, value: &str, reference: &str) -> String {
        format!(
            r#"<ItemAttribute Name="{}" Type="none" Value="{}" Parameter="SGAttribute" RelationshipTo="{}"/>"#,
            name, value, reference
        )
    }

    fn some(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|v| v.map(str::to_string)).collect()
    }

    #[test]
    fn test_empty_reference_targets_the_page_object() {
        init();
        let mut d = doc(&carrier("FONT", "Courier", ""));
        assert!(apply_attribute_overwrites(&mut d).is_empty());
        assert_eq!(
            fonts(&d),
            some(&[Some("Courier"), None, Some("Times"), Some("Arial")])
        );
    }

    #[test]
    fn test_relative_references() {
        init();
        let mut d = doc(&carrier("FONT", "Courier", "//ITEXT"));
        assert!(apply_attribute_overwrites(&mut d).is_empty());
        assert_eq!(
            fonts(&d),
            some(&[Some("Arial"), Some("Courier"), Some("Courier"), Some("Arial")])
        );

        let mut d = doc(&carrier("FONT", "Courier", "StoryText/ITEXT[@FONT]"));
        apply_attribute_overwrites(&mut d);
        assert_eq!(
            fonts(&d),
            some(&[Some("Arial"), None, Some("Courier"), Some("Arial")])
        );
    }

    #[test]
    fn test_carriers_apply_in_order() {
        init();
        let carriers = format!("{}{}", carrier("FONT", "One", ""), carrier("FONT", "Two", "."));
        let mut d = doc(&carriers);
        apply_attribute_overwrites(&mut d);
        assert_eq!(fonts(&d)[0].as_deref(), Some("Two"));
    }

    #[test]
    fn test_missing_target_is_reported_and_skipped() {
        init();
        let carriers = format!(
            "{}{}",
            carrier("FONT", "Courier", "Missing/ITEXT"),
            carrier("FILL", "Red", "")
        );
        let mut d = doc(&carriers);
        let diagnostics = apply_attribute_overwrites(&mut d);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::AttributeTarget);
        assert_eq!(fonts(&d)[0].as_deref(), Some("Arial"));
        let object = d.properties().unwrap().find_child("PAGEOBJECT").unwrap();
        assert_eq!(object.attr("FILL"), Some("Red"));
    }

    #[test]
    fn test_malformed_reference_is_reported() {
        init();
        let mut d = doc(&carrier("FONT", "Courier", "ITEXT[@]"));
        let diagnostics = apply_attribute_overwrites(&mut d);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::AttributePath);
    }

    #[test]
    fn test_other_item_attributes_are_ignored() {
        let mut d = doc(r#"<ItemAttribute Name="FONT" Value="X" Parameter="" RelationshipTo=""/>"#);
        assert!(find_carriers(&d.root).is_empty());
        assert!(apply_attribute_overwrites(&mut d).is_empty());
        assert_eq!(fonts(&d)[0].as_deref(), Some("Arial"));
    }

    #[test]
    fn test_effective_reference() {
        let mut c = find_carriers(&doc(&carrier("A", "", "/StoryText")).root).remove(0);
        assert_eq!(c.context, vec![0, 0]);
        assert_eq!(c.effective_reference(), "./StoryText");
        c.reference.clear();
        assert_eq!(c.effective_reference(), ".");
    }
}
