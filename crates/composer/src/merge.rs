//! Stacking substituted fragments into one document.
//!
//! The first fragment seeds the merge buffer unchanged. Every later fragment
//! contributes its pages and page objects, moved below the previous unit and
//! renumbered so that page numbers, object identifiers and frame links stay
//! consistent inside the merged document.

use crate::error::ComposerError;
use crate::ids::{IdAllocator, item_id};
use log::{debug, info, warn};
use slagen_document::scribus::{NO_LINK, attr, tag};
use slagen_document::{Document, Element, Node, VersionFamily};
use slagen_types::{Diagnostic, DiagnosticKind};
use std::collections::HashMap;

/// Shape of one unit, read from the seed's `DOCUMENT` element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitGeometry {
    pub pages_per_unit: i64,
    pub page_height: f64,
    pub vertical_gap: f64,
    pub group_count: i64,
    pub objects_per_unit: i64,
}

impl UnitGeometry {
    pub fn from_properties(properties: &Element) -> Result<Self, ComposerError> {
        let required = |attribute: &str| ComposerError::MissingAttribute {
            element: properties.name.clone(),
            attribute: attribute.to_string(),
        };
        Ok(Self {
            pages_per_unit: properties
                .attr_i64(attr::PAGE_COUNT)?
                .ok_or_else(|| required(attr::PAGE_COUNT))?,
            page_height: properties
                .attr_f64(attr::PAGE_HEIGHT)?
                .ok_or_else(|| required(attr::PAGE_HEIGHT))?,
            vertical_gap: properties.attr_f64(attr::GAP_VERTICAL)?.unwrap_or(0.0),
            group_count: properties.attr_i64(attr::GROUP_COUNT)?.unwrap_or(0),
            objects_per_unit: properties
                .child_elements()
                .filter(|e| e.name == tag::PAGEOBJECT)
                .count() as i64,
        })
    }

    /// Vertical distance between the first page of unit 0 and of `unit`.
    pub fn offset(&self, unit: usize) -> f64 {
        (self.page_height + self.vertical_gap) * self.page_shift(unit) as f64
    }

    /// Pages preceding `unit`.
    pub fn page_shift(&self, unit: usize) -> i64 {
        self.pages_per_unit * unit as i64
    }
}

/// The finished merge.
#[derive(Debug)]
pub struct MergedDocument {
    pub document: Document,
    pub units: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Accumulates fragments into a single document.
#[derive(Debug)]
pub struct MergeBuffer {
    document: Document,
    family: VersionFamily,
    geometry: UnitGeometry,
    units: usize,
    ids: IdAllocator,
    diagnostics: Vec<Diagnostic>,
}

impl MergeBuffer {
    /// Starts a merge from the first fragment.
    ///
    /// `contribution` is appended to the document comment field.
    pub fn new(mut seed: Document, contribution: &str) -> Result<Self, ComposerError> {
        let family = seed.family();
        let properties = seed.properties_mut()?;
        let geometry = UnitGeometry::from_properties(properties)?;
        let comment = format!(
            "{}{}",
            properties.attr(attr::CONTRIBUTION).unwrap_or_default(),
            contribution
        );
        properties.set_attr(attr::CONTRIBUTION, comment);

        let ids = IdAllocator::after_document(&seed.root);
        let mut buffer = Self {
            document: seed,
            family,
            geometry,
            units: 1,
            ids,
            diagnostics: Vec::new(),
        };

        if family == VersionFamily::Modern {
            // The seed keeps its identifiers. Links still have to resolve.
            let properties = buffer.document.properties_mut()?;
            let identity: HashMap<i64, i64> = properties
                .descendants()
                .filter(|e| e.name == tag::PAGEOBJECT)
                .filter_map(item_id)
                .map(|id| (id, id))
                .collect();
            let mut objects: Vec<&mut Element> = properties
                .child_elements_mut()
                .filter(|e| e.name == tag::PAGEOBJECT)
                .collect();
            relink_all(&mut objects, &identity, 0, &mut buffer.diagnostics);
        }

        debug!(
            "merge seeded: {:?}, {} page(s) and {} object(s) per unit",
            family, geometry.pages_per_unit, geometry.objects_per_unit
        );
        Ok(buffer)
    }

    pub fn geometry(&self) -> &UnitGeometry {
        &self.geometry
    }

    /// Units merged so far, including the seed.
    pub fn units(&self) -> usize {
        self.units
    }

    /// Appends the pages and page objects of the next unit.
    pub fn append(&mut self, mut fragment: Document) -> Result<(), ComposerError> {
        let unit = self.units;
        let properties = fragment.properties_mut()?;
        let mut moved: Vec<Element> = std::mem::take(&mut properties.children)
            .into_iter()
            .filter_map(|node| match node {
                Node::Element(e) if e.name == tag::PAGE || e.name == tag::PAGEOBJECT => Some(e),
                _ => None,
            })
            .collect();

        let offset = self.geometry.offset(unit);
        let page_shift = self.geometry.page_shift(unit);
        for element in &mut moved {
            shift_position(element, offset, page_shift)?;
        }

        match self.family {
            VersionFamily::Modern => self.renumber_items(&mut moved, unit),
            VersionFamily::Legacy14 => self.shift_legacy_links(&mut moved, unit),
        }

        let target = self.document.properties_mut()?;
        for element in moved {
            target.push_child(element);
        }
        self.units += 1;
        debug!("merged unit {} at vertical offset {}", unit + 1, offset);
        Ok(())
    }

    /// Gives every page object of a unit a fresh `ItemID` and follows its links.
    fn renumber_items(&mut self, moved: &mut [Element], unit: usize) {
        let mut id_map: HashMap<i64, i64> = HashMap::new();
        for element in moved.iter() {
            for object in std::iter::once(element)
                .chain(element.descendants())
                .filter(|e| e.name == tag::PAGEOBJECT)
            {
                if let Some(id) = item_id(object) {
                    id_map.entry(id).or_insert_with(|| self.ids.allocate());
                }
            }
        }

        let mut objects: Vec<&mut Element> = moved
            .iter_mut()
            .filter(|e| e.name == tag::PAGEOBJECT)
            .collect();
        relink_all(&mut objects, &id_map, unit, &mut self.diagnostics);
    }

    /// Links in 1.4 documents are positions in the object list; groups are
    /// numbered per document.
    fn shift_legacy_links(&mut self, moved: &mut [Element], unit: usize) {
        let link_shift = self.geometry.objects_per_unit * unit as i64;
        let group_shift = self.geometry.group_count * unit as i64;
        for object in moved.iter_mut().filter(|e| e.name == tag::PAGEOBJECT) {
            for link in [attr::NEXT_ITEM, attr::BACK_ITEM] {
                if let Ok(Some(target)) = object.attr_i64(link)
                    && target != NO_LINK
                {
                    object.set_attr(link, (target + link_shift).to_string());
                }
            }
            if group_shift != 0
                && let Some(groups) = object.attr(attr::GROUPS)
            {
                let shifted = shift_groups(groups, group_shift);
                object.set_attr(attr::GROUPS, shifted);
            }
        }
    }

    /// Writes the final page and group counts.
    pub fn finish(mut self) -> Result<MergedDocument, ComposerError> {
        let pages = self.geometry.page_shift(self.units);
        let properties = self.document.properties_mut()?;
        properties.set_attr(attr::PAGE_COUNT, pages.to_string());
        if self.family == VersionFamily::Legacy14 {
            properties.set_attr(
                attr::GROUP_COUNT,
                (self.geometry.group_count * self.units as i64).to_string(),
            );
        }
        info!("merged {} unit(s) into {} page(s)", self.units, pages);
        Ok(MergedDocument {
            document: self.document,
            units: self.units,
            diagnostics: self.diagnostics,
        })
    }
}

/// Moves a page or page object down by `offset` and over by `page_shift` pages.
fn shift_position(element: &mut Element, offset: f64, page_shift: i64) -> Result<(), ComposerError> {
    if element.name == tag::PAGE {
        let y = element.attr_f64(attr::PAGE_Y)?.unwrap_or(0.0);
        element.set_attr(attr::PAGE_Y, (y + offset).to_string());
        let number = element.attr_i64(attr::PAGE_NUMBER)?.unwrap_or(0);
        element.set_attr(attr::PAGE_NUMBER, (number + page_shift).to_string());
    } else {
        let y = element.attr_f64(attr::Y)?.unwrap_or(0.0);
        element.set_attr(attr::Y, (y + offset).to_string());
        if let Some(page) = element.attr_i64(attr::OWN_PAGE)?
            && page >= 0
        {
            element.set_attr(attr::OWN_PAGE, (page + page_shift).to_string());
        }
    }
    Ok(())
}

/// Applies `id_map` to the identifiers and links of `objects` and every page
/// object nested in them. Links to unknown objects are cut.
fn relink_all(
    objects: &mut [&mut Element],
    id_map: &HashMap<i64, i64>,
    unit: usize,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for object in objects.iter_mut() {
        object.walk_mut(&mut |e: &mut Element| {
            if e.name != tag::PAGEOBJECT {
                return;
            }
            if let Some(id) = item_id(e)
                && let Some(new_id) = id_map.get(&id)
            {
                e.set_attr(attr::ITEM_ID, new_id.to_string());
            }
            for link in [attr::NEXT_ITEM, attr::BACK_ITEM] {
                let Ok(Some(target)) = e.attr_i64(link) else {
                    continue;
                };
                if target == NO_LINK {
                    continue;
                }
                match id_map.get(&target) {
                    Some(new_target) => e.set_attr(link, new_target.to_string()),
                    None => {
                        let message = format!(
                            "unit {}: {} of object {} points at unknown object {}, unlinked",
                            unit + 1,
                            link,
                            e.attr(attr::ITEM_ID).unwrap_or("?"),
                            target
                        );
                        warn!("{}", message);
                        diagnostics.push(Diagnostic::new(DiagnosticKind::LinkTarget, message));
                        e.set_attr(link, NO_LINK.to_string());
                    }
                }
            }
        });
    }
}

fn shift_groups(groups: &str, shift: i64) -> String {
    groups
        .split_whitespace()
        .map(|g| match g.parse::<i64>() {
            Ok(id) => (id + shift).to_string(),
            Err(_) => g.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const MODERN: &str = r#"<SCRIBUSUTF8NEW Version="1.5.8"><DOCUMENT ANZPAGES="1" PAGEHEIGHT="842" GapVertical="40" DOCCONTRIB="Team">
        <PAGE PAGEYPOS="20" NUM="0"/>
        <PAGEOBJECT ItemID="100" YPOS="120" OwnPage="0" NEXTITEM="101" BACKITEM="-1"/>
        <PAGEOBJECT ItemID="101" YPOS="" OwnPage="0" NEXTITEM="-1" BACKITEM="100"/>
        <PAGEOBJECT ItemID="102" YPOS="300" OwnPage="-1">
            <PAGEOBJECT ItemID="103" YPOS="310" NEXTITEM="-1" BACKITEM="-1"/>
        </PAGEOBJECT>
    </DOCUMENT></SCRIBUSUTF8NEW>"#;

    const LEGACY: &str = r#"<SCRIBUSUTF8 Version="1.4.6"><DOCUMENT ANZPAGES="1" PAGEHEIGHT="100" GROUPC="2">
        <PAGE PAGEYPOS="10" NUM="0"/>
        <PAGEOBJECT YPOS="20" OwnPage="0" NEXTITEM="1" BACKITEM="-1" GROUPS="0 1" NUMGROUP="2"/>
        <PAGEOBJECT YPOS="30" OwnPage="0" NEXTITEM="-1" BACKITEM="0" GROUPS="" NUMGROUP="0"/>
    </DOCUMENT></SCRIBUSUTF8>"#;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn merge(template: &str, units: usize) -> MergedDocument {
        let mut buffer = MergeBuffer::new(Document::parse(template).unwrap(), "\nmerged").unwrap();
        for _ in 1..units {
            buffer.append(Document::parse(template).unwrap()).unwrap();
        }
        buffer.finish().unwrap()
    }

    fn objects(doc: &Document) -> Vec<&Element> {
        doc.properties()
            .unwrap()
            .child_elements()
            .filter(|e| e.name == "PAGEOBJECT")
            .collect()
    }

    #[test]
    fn test_seed_properties() {
        let merged = merge(MODERN, 3);
        let props = merged.document.properties().unwrap();
        assert_eq!(props.attr("ANZPAGES"), Some("3"));
        assert_eq!(props.attr("DOCCONTRIB"), Some("Team\nmerged"));
        assert_eq!(merged.units, 3);
    }

    #[test]
    fn test_pages_are_stacked() {
        let merged = merge(MODERN, 3);
        let pages: Vec<_> = merged
            .document
            .properties()
            .unwrap()
            .child_elements()
            .filter(|e| e.name == "PAGE")
            .map(|p| (p.attr("PAGEYPOS").unwrap().to_string(), p.attr("NUM").unwrap().to_string()))
            .collect();
        assert_eq!(
            pages,
            vec![
                ("20".to_string(), "0".to_string()),
                ("902".to_string(), "1".to_string()),
                ("1784".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_objects_are_shifted() {
        let merged = merge(MODERN, 2);
        let objs = objects(&merged.document);
        assert_eq!(objs.len(), 6);
        assert_eq!(objs[3].attr("YPOS"), Some("1002"));
        assert_eq!(objs[3].attr("OwnPage"), Some("1"));
        assert_eq!(objs[4].attr("YPOS"), Some("882"));
        assert_eq!(objs[5].attr("OwnPage"), Some("-1"));
    }

    #[test]
    fn test_identifiers_unique_and_links_resolve() {
        init();
        let merged = merge(MODERN, 4);
        assert!(merged.diagnostics.is_empty());

        let all: Vec<&Element> = merged
            .document
            .root
            .descendants()
            .filter(|e| e.name == "PAGEOBJECT")
            .collect();
        assert_eq!(all.len(), 16);
        let ids: HashSet<i64> = all.iter().filter_map(|e| item_id(e)).collect();
        assert_eq!(ids.len(), 16);

        for object in &all {
            for link in ["NEXTITEM", "BACKITEM"] {
                if let Some(target) = object.attr_i64(link).unwrap()
                    && target != NO_LINK
                {
                    assert!(ids.contains(&target), "dangling {} {}", link, target);
                }
            }
        }

        // Chains stay within their unit.
        let objs = objects(&merged.document);
        assert_eq!(objs[3].attr("ItemID"), Some("104"));
        assert_eq!(objs[3].attr("NEXTITEM"), Some("105"));
        assert_eq!(objs[4].attr("BACKITEM"), Some("104"));
    }

    #[test]
    fn test_unknown_link_is_cut() {
        init();
        let template = MODERN.replace(r#"NEXTITEM="101""#, r#"NEXTITEM="999""#);
        let merged = merge(&template, 2);
        assert_eq!(merged.diagnostics.len(), 2);
        assert!(merged.diagnostics.iter().all(|d| d.kind == DiagnosticKind::LinkTarget));
        assert!(
            objects(&merged.document)
                .iter()
                .all(|o| o.attr("NEXTITEM").is_none_or(|v| v == "-1"))
        );
    }

    #[test]
    fn test_legacy_links_and_groups() {
        let merged = merge(LEGACY, 3);
        let props = merged.document.properties().unwrap();
        assert_eq!(props.attr("GROUPC"), Some("6"));
        assert_eq!(props.attr("ANZPAGES"), Some("3"));

        let objs = objects(&merged.document);
        let links: Vec<_> = objs
            .iter()
            .map(|o| (o.attr("NEXTITEM").unwrap(), o.attr("BACKITEM").unwrap()))
            .collect();
        assert_eq!(
            links,
            vec![("1", "-1"), ("-1", "0"), ("3", "-1"), ("-1", "2"), ("5", "-1"), ("-1", "4")]
        );
        assert_eq!(objs[4].attr("GROUPS"), Some("4 5"));
        assert_eq!(objs[4].attr("NUMGROUP"), Some("2"));
        assert_eq!(objs[5].attr("GROUPS"), Some(""));
        assert_eq!(objs[4].attr("YPOS"), Some("220"));
    }

    #[test]
    fn test_missing_page_height() {
        let doc = Document::parse(r#"<R><DOCUMENT ANZPAGES="1"/></R>"#).unwrap();
        let err = MergeBuffer::new(doc, "").unwrap_err();
        assert!(matches!(err, ComposerError::MissingAttribute { .. }));
    }

    #[test]
    fn test_multi_page_units() {
        let template = MODERN
            .replace(r#"ANZPAGES="1""#, r#"ANZPAGES="2""#)
            .replace(
                r#"<PAGE PAGEYPOS="20" NUM="0"/>"#,
                r#"<PAGE PAGEYPOS="20" NUM="0"/><PAGE PAGEYPOS="902" NUM="1"/>"#,
            );
        let merged = merge(&template, 2);
        let props = merged.document.properties().unwrap();
        assert_eq!(props.attr("ANZPAGES"), Some("4"));
        let numbers: Vec<_> = props
            .child_elements()
            .filter(|e| e.name == "PAGE")
            .map(|p| p.attr("NUM").unwrap())
            .collect();
        assert_eq!(numbers, vec!["0", "1", "2", "3"]);
    }
}
