//! Settings stored inside a template.
//!
//! The settings live in a `JAVA` script element of the `DOCUMENT` element,
//! named after the storage name, with the JSON in its `SCRIPT` attribute.
//! The layout application keeps unknown scripts intact, so the settings
//! survive editing the template. A template without the element simply has
//! no stored settings.

use crate::error::GeneratorError;
use log::{debug, info};
use slagen_document::scribus::{attr, tag};
use slagen_document::{Document, Element, Node};
use slagen_types::Settings;
use std::path::Path;

/// Reads the stored settings of `document`, if any.
pub fn load_settings(document: &Document, storage_name: &str) -> Result<Option<Settings>, GeneratorError> {
    let properties = document.properties()?;
    let Some(container) = properties
        .child_elements()
        .find(|e| is_container(e, storage_name))
    else {
        debug!("no stored settings named {}", storage_name);
        return Ok(None);
    };
    let json = container.attr(attr::SCRIPT).unwrap_or_default();
    Ok(Some(Settings::from_json(json)?))
}

/// Stores `settings` in `document`, replacing earlier stored settings.
///
/// A new container goes before the first color declaration, which is where
/// the layout application puts its own scripts.
pub fn store_settings(document: &mut Document, settings: &Settings, storage_name: &str) -> Result<(), GeneratorError> {
    let json = settings.to_json()?;
    let properties = document.properties_mut()?;

    if let Some(existing) = properties
        .child_elements_mut()
        .find(|e| is_container(e, storage_name))
    {
        existing.set_attr(attr::SCRIPT, json);
        return Ok(());
    }

    let container = Element::new(tag::JAVA)
        .with_attr(attr::SCRIPT_NAME, storage_name)
        .with_attr(attr::SCRIPT, json);
    match properties.position_of_child(tag::COLOR) {
        Some(index) => properties.children.insert(index, Node::Element(container)),
        None => properties.push_child(container),
    }
    Ok(())
}

pub fn load_settings_from_file(template: &Path, storage_name: &str) -> Result<Option<Settings>, GeneratorError> {
    if !template.exists() {
        return Err(GeneratorError::TemplateNotFound(template.to_path_buf()));
    }
    let document = Document::from_file(template)?;
    load_settings(&document, storage_name)
}

/// Rewrites `template` with `settings` stored in it.
pub fn store_settings_in_file(
    template: &Path,
    settings: &Settings,
    storage_name: &str,
    indent: bool,
) -> Result<(), GeneratorError> {
    if !template.exists() {
        return Err(GeneratorError::TemplateNotFound(template.to_path_buf()));
    }
    let mut document = Document::from_file(template)?;
    store_settings(&mut document, settings, storage_name)?;
    document.write_file(template, indent)?;
    info!("saved settings to {}", template.display());
    Ok(())
}

fn is_container(element: &Element, storage_name: &str) -> bool {
    element.name == tag::JAVA && element.attr(attr::SCRIPT_NAME) == Some(storage_name)
}
