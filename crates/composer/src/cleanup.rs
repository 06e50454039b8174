//! Removal of text runs emptied by placeholder cleaning.

use log::debug;
use slagen_document::scribus::{NO_LINK, attr, tag};
use slagen_document::{Document, Element, Node, VersionFamily};
use slagen_types::CleanupOptions;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub removed_texts: usize,
    pub removed_objects: usize,
}

/// Removes every `ITEXT` whose text is empty.
///
/// The paragraph break right before a removed run goes with it when
/// `options.remove_preceding_paragraph` is set. A page object left without
/// any text run is removed too, unless it is part of a frame chain. Running
/// this twice changes nothing the second time.
pub fn remove_empty_texts(document: &mut Document, options: CleanupOptions) -> CleanupReport {
    let mut report = CleanupReport::default();
    if !options.enabled {
        return report;
    }
    let family = document.family();
    prune(&mut document.root, options, family, &mut report);
    if report.removed_texts > 0 {
        debug!(
            "removed {} empty text run(s) and {} empty object(s)",
            report.removed_texts, report.removed_objects
        );
    }
    report
}

/// Returns whether `element` (or a non-object descendant) lost its last text run.
fn prune(element: &mut Element, options: CleanupOptions, family: VersionFamily, report: &mut CleanupReport) -> bool {
    let children = std::mem::take(&mut element.children);
    let mut kept: Vec<Node> = Vec::with_capacity(children.len());
    let mut emptied = false;
    let mut removed_here = 0;
    let mut object_position: i64 = 0;
    let mut removed_positions = Vec::new();

    for child in children {
        let Node::Element(mut e) = child else {
            kept.push(child);
            continue;
        };

        if is_empty_run(&e) {
            removed_here += 1;
            if options.remove_preceding_paragraph
                && matches!(kept.last(), Some(Node::Element(p)) if p.name == tag::PARA)
            {
                kept.pop();
            }
            continue;
        }

        let child_emptied = prune(&mut e, options, family, report);
        if e.name == tag::PAGEOBJECT {
            let position = object_position;
            object_position += 1;
            if child_emptied && is_removable(&e) {
                report.removed_objects += 1;
                removed_positions.push(position);
                continue;
            }
        } else {
            emptied |= child_emptied;
        }
        kept.push(Node::Element(e));
    }

    element.children = kept;
    report.removed_texts += removed_here;
    if removed_here > 0 && element.find_child(tag::ITEXT).is_none() {
        emptied = true;
    }
    if family == VersionFamily::Legacy14 && !removed_positions.is_empty() {
        renumber_positions(element, &removed_positions);
    }
    emptied
}

fn is_empty_run(element: &Element) -> bool {
    element.name == tag::ITEXT && element.attr(attr::TEXT) == Some("")
}

fn is_removable(object: &Element) -> bool {
    let unlinked = |link: &str| matches!(object.attr_i64(link), Ok(None) | Ok(Some(NO_LINK)));
    object.descendants().all(|e| e.name != tag::ITEXT)
        && unlinked(attr::NEXT_ITEM)
        && unlinked(attr::BACK_ITEM)
}

/// Legacy links are object positions; close the gaps left by removed objects.
fn renumber_positions(parent: &mut Element, removed: &[i64]) {
    for object in parent.child_elements_mut().filter(|e| e.name == tag::PAGEOBJECT) {
        for link in [attr::NEXT_ITEM, attr::BACK_ITEM] {
            if let Ok(Some(target)) = object.attr_i64(link)
                && target >= 0
            {
                let shift = removed.iter().filter(|&&p| p < target).count() as i64;
                if shift > 0 {
                    object.set_attr(link, (target - shift).to_string());
                }
            }
        }
    }
}
