//! Serializes the owned tree with `quick-xml`.

use crate::Document;
use crate::error::DocumentError;
use crate::node::{Element, Node};
use quick_xml::Writer;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use std::borrow::Cow;
use std::io::Write;

/// Writes `doc` with an XML declaration. With `indent`, nested elements are
/// indented by three spaces.
pub fn write_document<W: Write>(doc: &Document, out: W, indent: bool) -> Result<(), DocumentError> {
    let mut writer = if indent {
        Writer::new_with_indent(out, b' ', 3)
    } else {
        Writer::new(out)
    };
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    if !indent {
        writer.get_mut().write_all(b"\n")?;
    }
    write_element(&mut writer, &doc.root)?;
    writer.get_mut().write_all(b"\n")?;
    Ok(())
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &Element) -> Result<(), DocumentError> {
    let mut start = BytesStart::new(element.name.as_str());
    for attr in &element.attributes {
        let escaped = escape_attribute(&attr.value);
        start.push_attribute(Attribute {
            key: QName(attr.name.as_bytes()),
            value: Cow::Owned(escaped.into_bytes()),
        });
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        match child {
            Node::Element(e) => write_element(writer, e)?,
            Node::Text(t) => writer.write_event(Event::Text(BytesText::new(t)))?,
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

/// Escapes markup characters and the whitespace characters attribute-value
/// normalization would otherwise turn into spaces.
pub fn escape_attribute(value: &str) -> String {
    let escaped = quick_xml::escape::escape(value);
    if !escaped.contains(['\t', '\n', '\r']) {
        return escaped.into_owned();
    }
    let mut out = String::with_capacity(escaped.len() + 8);
    for c in escaped.chars() {
        match c {
            '\t' => out.push_str("&#9;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            other => out.push(other),
        }
    }
    out
}
