//! Builds the owned tree from XML text with `roxmltree`.

use crate::Document;
use crate::error::DocumentError;
use crate::node::{Attribute, Element, Node};
use log::trace;

/// Parses `text` into a [`Document`].
///
/// Whitespace-only text nodes are dropped; layout documents carry no mixed
/// content and the serializer re-indents on output. Comments and processing
/// instructions are not kept.
pub fn parse_document(text: &str) -> Result<Document, DocumentError> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    let doc = roxmltree::Document::parse_with_options(text, options)?;
    let root_node = doc.root_element();
    trace!(
        "parsing <{}> with {} nodes",
        root_node.tag_name().name(),
        doc.descendants().count()
    );
    let mut root = convert_element(root_node);

    // Namespace declarations are not attributes in roxmltree; re-emit the ones
    // in scope at the root so prefixed names stay resolvable.
    for ns in root_node.namespaces() {
        if ns.uri() == "http://www.w3.org/XML/1998/namespace" {
            continue;
        }
        let name = match ns.name() {
            Some(prefix) => format!("xmlns:{}", prefix),
            None => "xmlns".to_string(),
        };
        root.attributes.push(Attribute {
            name,
            value: ns.uri().to_string(),
        });
    }

    Ok(Document { root })
}

fn convert_element(node: roxmltree::Node) -> Element {
    let tag = node.tag_name();
    let name = qualified_name(node, tag.namespace(), tag.name());

    let attributes = node
        .attributes()
        .map(|a| Attribute {
            name: qualified_name(node, a.namespace(), a.name()),
            value: a.value().to_string(),
        })
        .collect();

    let children = node
        .children()
        .filter_map(|child| {
            if child.is_element() {
                Some(Node::Element(convert_element(child)))
            } else if child.is_text() {
                child
                    .text()
                    .filter(|t| !t.trim().is_empty())
                    .map(|t| Node::Text(t.to_string()))
            } else {
                None
            }
        })
        .collect();

    Element {
        name,
        attributes,
        children,
    }
}

fn qualified_name(node: roxmltree::Node, namespace: Option<&str>, local: &str) -> String {
    match namespace.and_then(|ns| node.lookup_prefix(ns)) {
        Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, local),
        _ => local.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_attribute_order_and_structure() {
        let doc = parse_document(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<SCRIBUSUTF8NEW Version="1.5.8">
    <DOCUMENT ANZPAGES="1" PAGEHEIGHT="841.89">
        <PAGE NUM="0"/>
        <PAGEOBJECT ItemID="7" YPOS="">
            <StoryText><ITEXT CH="Hello &amp; bye"/></StoryText>
        </PAGEOBJECT>
    </DOCUMENT>
</SCRIBUSUTF8NEW>"#,
        )
        .unwrap();

        assert_eq!(doc.root.name, "SCRIBUSUTF8NEW");
        let document = doc.root.find_child("DOCUMENT").unwrap();
        assert_eq!(document.attributes[0].name, "ANZPAGES");
        assert_eq!(document.children.len(), 2);
        let itext = document.descendants().find(|e| e.name == "ITEXT").unwrap();
        assert_eq!(itext.attr("CH"), Some("Hello & bye"));
        let object = document.find_child("PAGEOBJECT").unwrap();
        assert_eq!(object.attr("YPOS"), Some(""));
    }

    #[test]
    fn test_text_content_is_kept() {
        let doc = parse_document("<a><b>  text </b>\n  <c/></a>").unwrap();
        assert_eq!(doc.root.find_child("b").unwrap().text(), "  text ");
        assert_eq!(doc.root.children.len(), 2);
    }

    #[test]
    fn test_malformed_xml() {
        assert!(matches!(
            parse_document("<a><b></a>"),
            Err(DocumentError::Parse(_))
        ));
    }
}
