//! Owned, mutable SVG tree built from a roxmltree parse

use crate::error::{Error, Result};
use crate::qr::format_number;
use crate::svg::transform::Transform;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Elements whose character data is rendered, so whitespace inside them matters.
pub(crate) const TEXT_CONTENT_ELEMENTS: &[&str] = &["text", "tspan", "textPath", "title", "desc", "style"];

/// Index of a node inside a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// An element with its qualified name, namespace declarations and attributes
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    /// Qualified tag name, e.g. `text` or `sodipodi:namedview`
    pub name: String,
    /// Namespace declarations made on this element as `(prefix, uri)`
    pub namespaces: Vec<(Option<String>, String)>,
    /// Attributes in document order, names qualified with their prefix
    pub attributes: Vec<(String, String)>,
}

impl Element {
    /// Create an element without attributes
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder-style attribute setter
    pub fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Tag name without its namespace prefix
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    /// Value of an attribute by qualified name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing the value in place when it already exists
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }
}

/// Content of a single node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// An element
    Element(Element),
    /// Character data
    Text(String),
    /// `<!-- ... -->`
    Comment(String),
    /// `<?target value?>`
    ProcessingInstruction {
        /// PI target
        target: String,
        /// PI content
        value: Option<String>,
    },
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Visible coordinate bounds of the document
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Minimum x
    pub x: f64,
    /// Minimum y
    pub y: f64,
    /// Width in user units
    pub width: f64,
    /// Height in user units
    pub height: f64,
}

impl Viewport {
    /// Lowest visible y coordinate
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Horizontal center
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Parse a `viewBox` attribute value
    pub fn parse(value: &str) -> Option<Self> {
        let numbers = parse_number_list(value);
        match numbers.as_slice() {
            [x, y, width, height] if *width > 0.0 && *height > 0.0 => Some(Self {
                x: *x,
                y: *y,
                width: *width,
                height: *height,
            }),
            _ => None,
        }
    }

    fn to_attribute(self) -> String {
        format!(
            "{} {} {} {}",
            format_number(self.x),
            format_number(self.y),
            format_number(self.width),
            format_number(self.height)
        )
    }
}

/// An SVG document held as an arena of nodes with a label index
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
    root: NodeId,
    label_attribute: String,
    labels: HashMap<String, NodeId>,
}

impl Document {
    /// Read and parse a template from disk.
    pub fn load(path: &Path, label_attribute: &str) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::TemplateNotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;
        let document = Self::parse(&text, label_attribute)?;
        tracing::debug!(
            path = %path.display(),
            nodes = document.nodes.len(),
            labels = document.labels.len(),
            "Loaded template"
        );
        Ok(document)
    }

    /// Parse SVG text. Nodes are addressed by the value of `label_attribute`.
    pub fn parse(text: &str, label_attribute: &str) -> Result<Self> {
        let mut options = roxmltree::ParsingOptions::default();
        options.allow_dtd = true;
        let xml = roxmltree::Document::parse_with_options(text, options)?;
        let root = xml.root_element();
        if root.tag_name().name() != "svg" {
            return Err(Error::TemplateParse(format!(
                "root element is <{}>, expected <svg>",
                root.tag_name().name()
            )));
        }

        let mut document = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            label_attribute: label_attribute.to_string(),
            labels: HashMap::new(),
        };
        document.root = document
            .copy_node(root, None)
            .ok_or_else(|| Error::TemplateParse("empty document".to_string()))?;
        document.rebuild_index();
        Ok(document)
    }

    fn copy_node(&mut self, node: roxmltree::Node<'_, '_>, parent: Option<NodeId>) -> Option<NodeId> {
        let kind = if node.is_element() {
            NodeKind::Element(copy_element(node))
        } else if node.is_text() {
            let text = node.text().unwrap_or_default();
            let keeps_whitespace = node
                .parent_element()
                .is_some_and(|p| TEXT_CONTENT_ELEMENTS.contains(&p.tag_name().name()));
            if text.trim().is_empty() && !keeps_whitespace {
                return None;
            }
            NodeKind::Text(text.to_string())
        } else if node.is_comment() {
            NodeKind::Comment(node.text().unwrap_or_default().to_string())
        } else if let Some(pi) = node.pi() {
            NodeKind::ProcessingInstruction {
                target: pi.target.to_string(),
                value: pi.value.map(str::to_string),
            }
        } else {
            return None;
        };

        let id = self.push(kind, parent);
        for child in node.children() {
            if let Some(child_id) = self.copy_node(child, Some(id)) {
                self.nodes[id.0].children.push(child_id);
            }
        }
        Some(id)
    }

    fn push(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent,
            children: Vec::new(),
        });
        id
    }

    fn rebuild_index(&mut self) {
        self.labels.clear();
        for id in self.descendants(self.root) {
            self.register_label(id);
        }
    }

    fn register_label(&mut self, id: NodeId) {
        let Some(label) = self
            .element(id)
            .and_then(|el| el.attribute(&self.label_attribute))
            .map(str::to_string)
        else {
            return;
        };
        if self.labels.contains_key(&label) {
            tracing::debug!(%label, "Duplicate label ignored, first match wins");
        } else {
            self.labels.insert(label, id);
        }
    }

    /// The `<svg>` root element
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Attribute used to address nodes
    pub fn label_attribute(&self) -> &str {
        &self.label_attribute
    }

    /// Find the node carrying a label
    pub fn lookup(&self, label: &str) -> Option<NodeId> {
        self.labels.get(label).copied()
    }

    /// Content of a node
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    /// Element data, if the node is an element
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Mutable element data, if the node is an element
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Parent of a node; `None` for the root
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Direct children in document order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Direct children that are elements
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| self.element(*c).is_some())
    }

    /// The node and everything below it, depth-first in document order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Concatenated character data below a node
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|n| match self.kind(n) {
                NodeKind::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Append a node as the last child of `parent`
    pub fn append(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = self.push(kind, Some(parent));
        self.nodes[parent.0].children.push(id);
        self.register_label(id);
        id
    }

    /// Append an element as the last child of `parent`
    pub fn append_element(&mut self, parent: NodeId, element: Element) -> NodeId {
        self.append(parent, NodeKind::Element(element))
    }

    /// Append character data as the last child of `parent`
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.append(parent, NodeKind::Text(text.to_string()))
    }

    /// Detach every child of a node
    pub fn clear_children(&mut self, id: NodeId) {
        self.retain_children(id, |_| false);
    }

    /// Detach the children for which `keep` returns false
    pub fn retain_children<F>(&mut self, id: NodeId, mut keep: F)
    where
        F: FnMut(&NodeKind) -> bool,
    {
        let children = std::mem::take(&mut self.nodes[id.0].children);
        let (kept, removed): (Vec<_>, Vec<_>) = children
            .into_iter()
            .partition(|c| keep(&self.nodes[c.0].kind));
        self.nodes[id.0].children = kept;

        for child in removed {
            for detached in self.descendants(child) {
                self.labels.retain(|_, target| *target != detached);
            }
            self.nodes[child.0].parent = None;
        }
    }

    /// Combined transform mapping a node's local coordinates to the root's
    /// user space, including the node's own `transform`.
    pub fn transform_to_root(&self, id: NodeId) -> Transform {
        let mut transform = Transform::identity();
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.root {
                break;
            }
            if let Some(local) = self
                .element(node)
                .and_then(|el| el.attribute("transform"))
                .and_then(Transform::parse)
            {
                transform = transform.then(&local);
            }
            current = self.parent(node);
        }
        transform
    }

    /// Read the document viewport from `viewBox`, falling back to numeric
    /// `width`/`height` at the origin.
    pub fn viewport(&self) -> Result<Viewport> {
        let root = self
            .element(self.root)
            .ok_or_else(|| Error::InvalidViewport("root is not an element".to_string()))?;

        if let Some(view_box) = root.attribute("viewBox") {
            return Viewport::parse(view_box)
                .ok_or_else(|| Error::InvalidViewport(format!("unparsable viewBox '{view_box}'")));
        }

        let width = root.attribute("width").and_then(split_length);
        let height = root.attribute("height").and_then(split_length);
        match (width, height) {
            (Some((width, _)), Some((height, _))) if width > 0.0 && height > 0.0 => Ok(Viewport {
                x: 0.0,
                y: 0.0,
                width,
                height,
            }),
            _ => Err(Error::InvalidViewport(
                "root has neither viewBox nor numeric width/height".to_string(),
            )),
        }
    }

    /// Replace the viewport. Absolute `width`/`height` attributes are scaled
    /// by the same factor as the viewBox so the document keeps its unit size.
    pub fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        let previous = self.viewport()?;
        let root = self.root;
        let root = self
            .element_mut(root)
            .ok_or_else(|| Error::InvalidViewport("root is not an element".to_string()))?;

        for (name, factor) in [
            ("width", viewport.width / previous.width),
            ("height", viewport.height / previous.height),
        ] {
            let scaled = root
                .attribute(name)
                .and_then(split_length)
                .filter(|(_, unit)| *unit != "%")
                .map(|(value, unit)| format!("{}{unit}", format_number(value * factor)));
            if let Some(scaled) = scaled {
                root.set_attribute(name, scaled);
            }
        }
        root.set_attribute("viewBox", viewport.to_attribute());
        Ok(())
    }
}

fn copy_element(node: roxmltree::Node<'_, '_>) -> Element {
    let tag = node.tag_name();
    let prefix = match tag.namespace() {
        Some(uri) if node.default_namespace() != Some(uri) => namespace_prefix(node, uri),
        _ => None,
    };

    let inherited: Vec<(Option<&str>, &str)> = node
        .parent_element()
        .map(|p| p.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();
    let namespaces = node
        .namespaces()
        .filter(|ns| ns.name() != Some("xml"))
        .filter(|ns| !inherited.contains(&(ns.name(), ns.uri())))
        .map(|ns| (ns.name().map(str::to_string), ns.uri().to_string()))
        .collect();

    let attributes = node
        .attributes()
        .map(|attr| {
            let name = match attr.namespace().and_then(|uri| namespace_prefix(node, uri)) {
                Some(prefix) => format!("{prefix}:{}", attr.name()),
                None => attr.name().to_string(),
            };
            (name, attr.value().to_string())
        })
        .collect();

    Element {
        name: qualify(prefix.as_deref(), tag.name()),
        namespaces,
        attributes,
    }
}

fn namespace_prefix(node: roxmltree::Node<'_, '_>, uri: &str) -> Option<String> {
    if uri == XML_NAMESPACE {
        return Some("xml".to_string());
    }
    node.namespaces()
        .find(|ns| ns.uri() == uri && ns.name().is_some())
        .and_then(|ns| ns.name())
        .map(str::to_string)
}

fn qualify(prefix: Option<&str>, local: &str) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}:{local}"),
        None => local.to_string(),
    }
}

/// Parse a whitespace/comma separated number list.
pub(crate) fn parse_number_list(value: &str) -> Vec<f64> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<f64>().ok())
        .collect()
}

/// Split a length like `85.6mm` into its number and unit.
pub(crate) fn split_length(value: &str) -> Option<(f64, &str)> {
    let value = value.trim();
    let end = value
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+')))
        .unwrap_or(value.len());
    let number = value[..end].parse::<f64>().ok()?;
    Some((number, value[end..].trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg"
     xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape"
     width="150mm" height="90mm" viewBox="0 0 300 180">
  <!-- card -->
  <g inkscape:label="Layer 1" transform="translate(5,10)">
    <text id="Name" x="20" y="40" xml:space="preserve"><tspan id="NameSpan" style="fill:#000">Old</tspan></text>
    <text id="Name">Duplicate</text>
  </g>
</svg>"##;

    #[test]
    fn test_parse_and_lookup() {
        let doc = Document::parse(SAMPLE, "id").unwrap();
        let name = doc.lookup("Name").unwrap();
        assert_eq!(doc.element(name).unwrap().local_name(), "text");
        assert_eq!(doc.text_content(name), "Old");
        assert!(doc.lookup("Missing").is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let doc = Document::parse(SAMPLE, "id").unwrap();
        let name = doc.lookup("Name").unwrap();
        assert_eq!(doc.element(name).unwrap().attribute("x"), Some("20"));
    }

    #[test]
    fn test_prefixed_attributes_survive() {
        let doc = Document::parse(SAMPLE, "inkscape:label").unwrap();
        let layer = doc.lookup("Layer 1").unwrap();
        assert_eq!(doc.element(layer).unwrap().name, "g");

        let name = Document::parse(SAMPLE, "id").unwrap();
        let text = name.lookup("Name").unwrap();
        assert_eq!(
            name.element(text).unwrap().attribute("xml:space"),
            Some("preserve")
        );
    }

    #[test]
    fn test_rejects_non_svg_root() {
        let err = Document::parse("<html/>", "id").unwrap_err();
        assert!(matches!(err, Error::TemplateParse(_)));
        let err = Document::parse("<svg>", "id").unwrap_err();
        assert!(matches!(err, Error::TemplateParse(_)));
    }

    #[test]
    fn test_missing_template() {
        let err = Document::load(Path::new("/nonexistent/card.svg"), "id").unwrap_err();
        assert!(matches!(err, Error::TemplateNotFound(_)));
    }

    #[test]
    fn test_viewport_round_trip() {
        let mut doc = Document::parse(SAMPLE, "id").unwrap();
        let viewport = doc.viewport().unwrap();
        assert_eq!(
            viewport,
            Viewport {
                x: 0.0,
                y: 0.0,
                width: 300.0,
                height: 180.0
            }
        );

        doc.set_viewport(Viewport {
            x: -20.0,
            y: 0.0,
            width: 340.0,
            height: 360.0,
        })
        .unwrap();
        let root = doc.element(doc.root()).unwrap();
        assert_eq!(root.attribute("viewBox"), Some("-20 0 340 360"));
        assert_eq!(root.attribute("width"), Some("170mm"));
        assert_eq!(root.attribute("height"), Some("180mm"));
    }

    #[test]
    fn test_viewport_from_dimensions() {
        let doc = Document::parse(r#"<svg width="200" height="100"/>"#, "id").unwrap();
        assert_eq!(doc.viewport().unwrap().width, 200.0);

        let doc = Document::parse(r#"<svg width="100%"/>"#, "id").unwrap();
        assert!(matches!(doc.viewport(), Err(Error::InvalidViewport(_))));
    }

    #[test]
    fn test_clear_children_drops_labels() {
        let mut doc = Document::parse(SAMPLE, "id").unwrap();
        let name = doc.lookup("Name").unwrap();
        assert!(doc.lookup("NameSpan").is_some());
        doc.clear_children(name);
        assert!(doc.children(name).is_empty());
        assert!(doc.lookup("NameSpan").is_none());
    }

    #[test]
    fn test_append_registers_label() {
        let mut doc = Document::parse(SAMPLE, "id").unwrap();
        let root = doc.root();
        let group = doc.append_element(root, Element::new("g").with_attribute("id", "Added"));
        assert_eq!(doc.lookup("Added"), Some(group));
        assert_eq!(doc.parent(group), Some(root));
    }

    #[test]
    fn test_transform_to_root() {
        let doc = Document::parse(SAMPLE, "id").unwrap();
        let name = doc.lookup("Name").unwrap();
        assert_eq!(doc.transform_to_root(name).apply(20.0, 40.0), (25.0, 50.0));
    }

    #[test]
    fn test_split_length() {
        assert_eq!(split_length("85.6mm"), Some((85.6, "mm")));
        assert_eq!(split_length(" 300 "), Some((300.0, "")));
        assert_eq!(split_length("1.5em"), Some((1.5, "em")));
        assert_eq!(split_length("auto"), None);
    }
}
