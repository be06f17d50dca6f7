//! Pretty-printing serializer for [`Document`]

use crate::svg::document::{Document, NodeId, NodeKind, TEXT_CONTENT_ELEMENTS};
use std::fmt::Write;

/// Declaration written at the top of every output document.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

const INDENT: &str = "  ";

/// Serialize a document with an XML declaration and two-space indentation.
///
/// Text content elements, and elements that hold character data, are
/// written on one line so indentation never ends up in rendered text.
pub fn to_string_pretty(document: &Document) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str(XML_DECLARATION);
    out.push('\n');
    write_node(document, document.root(), 0, false, &mut out);
    out.push('\n');
    out
}

fn write_node(document: &Document, id: NodeId, depth: usize, inline: bool, out: &mut String) {
    match document.kind(id) {
        NodeKind::Element(element) => {
            out.push('<');
            out.push_str(&element.name);
            for (prefix, uri) in &element.namespaces {
                match prefix {
                    Some(prefix) => {
                        let _ = write!(out, " xmlns:{prefix}=\"{}\"", escape_attribute(uri));
                    }
                    None => {
                        let _ = write!(out, " xmlns=\"{}\"", escape_attribute(uri));
                    }
                }
            }
            for (name, value) in &element.attributes {
                let _ = write!(out, " {name}=\"{}\"", escape_attribute(value));
            }

            let children = document.children(id);
            if children.is_empty() {
                out.push_str("/>");
                return;
            }
            out.push('>');

            let inline = inline
                || TEXT_CONTENT_ELEMENTS.contains(&element.local_name())
                || children
                    .iter()
                    .any(|c| matches!(document.kind(*c), NodeKind::Text(_)));
            for child in children {
                if !inline {
                    out.push('\n');
                    push_indent(out, depth + 1);
                }
                write_node(document, *child, depth + 1, inline, out);
            }
            if !inline {
                out.push('\n');
                push_indent(out, depth);
            }
            let _ = write!(out, "</{}>", element.name);
        }
        NodeKind::Text(text) => out.push_str(&escape_text(text)),
        NodeKind::Comment(text) => {
            let _ = write!(out, "<!--{text}-->");
        }
        NodeKind::ProcessingInstruction { target, value } => match value {
            Some(value) => {
                let _ = write!(out, "<?{target} {value}?>");
            }
            None => {
                let _ = write!(out, "<?{target}?>");
            }
        },
    }
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}

fn escape_attribute(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            '\t' => out.push_str("&#9;"),
            other => out.push(other),
        }
    }
    out
}
