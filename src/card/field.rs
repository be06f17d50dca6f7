//! Substitution of labelled text fields

use crate::svg::style::disable_stroke;
use crate::svg::{Document, NodeId, NodeKind};

/// An updatable text field, resolved once from its label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    /// `<text>` whose character data is set directly
    DirectText {
        /// The `<text>` element
        node: NodeId,
    },
    /// `<text>` holding a single styled `<tspan>` that carries the text
    StyledSpan {
        /// The `<text>` element
        node: NodeId,
        /// Its only child element
        span: NodeId,
    },
}

impl TextField {
    /// Find the text field carrying `field_id`.
    ///
    /// Returns `None` when no node has the label or the node is not a `<text>`.
    pub fn resolve(document: &Document, field_id: &str) -> Option<Self> {
        let node = document.lookup(field_id)?;
        if document.element(node)?.local_name() != "text" {
            tracing::debug!(field = field_id, "Labelled node is not a text element");
            return None;
        }

        let mut elements = document.child_elements(node);
        let field = match (elements.next(), elements.next()) {
            (Some(span), None)
                if document.element(span).map(|el| el.local_name()) == Some("tspan") =>
            {
                Self::StyledSpan { node, span }
            }
            _ => Self::DirectText { node },
        };
        Some(field)
    }

    /// The `<text>` element of this field
    pub fn node(&self) -> NodeId {
        match self {
            Self::DirectText { node } | Self::StyledSpan { node, .. } => *node,
        }
    }

    /// Baseline position of the field in root user space.
    ///
    /// Uses the span's `x`/`y` when it has them, else the text element's.
    pub fn baseline(&self, document: &Document) -> Option<(f64, f64)> {
        let node = self.node();
        let coordinate = |name: &str| {
            let from = |id: NodeId| {
                document
                    .element(id)
                    .and_then(|el| el.attribute(name))
                    .and_then(first_number)
            };
            match self {
                Self::StyledSpan { span, .. } => from(*span).or_else(|| from(node)),
                Self::DirectText { .. } => from(node),
            }
        };

        let y = coordinate("y")?;
        let x = coordinate("x").unwrap_or(0.0);
        Some(document.transform_to_root(node).apply(x, y))
    }

    /// Replace the displayed text and disable glyph strokes.
    ///
    /// Fill and font declarations are kept as they are.
    pub fn update(&self, document: &mut Document, text: &str) {
        match *self {
            Self::StyledSpan { node, span } => {
                document.retain_children(node, |kind| !matches!(kind, NodeKind::Text(_)));
                document.clear_children(span);
                document.append_text(span, text);
                rewrite_style(document, span);
            }
            Self::DirectText { node } => {
                document.clear_children(node);
                document.append_text(node, text);
                rewrite_style(document, node);
            }
        }
    }
}

/// Replace the text of the field labelled `field_id`.
///
/// A missing field is logged and reported as `false`; the caller carries on
/// with that field left as it is in the template.
pub fn update_field(document: &mut Document, field_id: &str, new_text: &str) -> bool {
    match TextField::resolve(document, field_id) {
        Some(field) => {
            field.update(document, new_text);
            tracing::info!(
                field = field_id,
                chars = new_text.chars().count(),
                "Updated text field"
            );
            true
        }
        None => {
            tracing::warn!(field = field_id, "Text field not found in template, leaving it unchanged");
            false
        }
    }
}

fn rewrite_style(document: &mut Document, id: NodeId) {
    if let Some(element) = document.element_mut(id) {
        let style = disable_stroke(element.attribute("style").unwrap_or_default());
        element.set_attribute("style", style);
    }
}

fn first_number(value: &str) -> Option<f64> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .find(|s| !s.is_empty())?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::svg::to_string_pretty;

    const TEMPLATE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 300 180">
  <g transform="translate(0,5)">
    <text id="Styled" x="150" style="text-anchor:middle">stray<tspan x="150" y="95" style="font-size:16px;fill:#1a1a1a;stroke:#000;stroke-width:0.3">Network</tspan></text>
    <text id="Plain" x="10" y="140" style="fill:blue">Old <tspan>a</tspan><tspan>b</tspan></text>
    <rect id="Box" width="1" height="1"/>
  </g>
</svg>"##;

    fn parse() -> Document {
        Document::parse(TEMPLATE, "id").unwrap()
    }

    #[test]
    fn test_resolve_variants() {
        let doc = parse();
        assert!(matches!(
            TextField::resolve(&doc, "Styled"),
            Some(TextField::StyledSpan { .. })
        ));
        assert!(matches!(
            TextField::resolve(&doc, "Plain"),
            Some(TextField::DirectText { .. })
        ));
        assert_eq!(TextField::resolve(&doc, "Box"), None);
        assert_eq!(TextField::resolve(&doc, "Nope"), None);
    }

    #[test]
    fn test_styled_span_update() {
        let mut doc = parse();
        assert!(update_field(&mut doc, "Styled", "HomeNet"));

        let field = TextField::resolve(&doc, "Styled").unwrap();
        let TextField::StyledSpan { node, span } = field else {
            panic!("expected styled span, got {field:?}");
        };
        assert_eq!(doc.text_content(node), "HomeNet");
        assert_eq!(doc.children(node).len(), 1);
        assert_eq!(
            doc.element(span).unwrap().attribute("style"),
            Some("font-size:16px;fill:#1a1a1a;stroke:none")
        );
        assert_eq!(doc.element(span).unwrap().attribute("y"), Some("95"));
    }

    #[test]
    fn test_direct_text_update() {
        let mut doc = parse();
        assert!(update_field(&mut doc, "Plain", "s3cr3t!"));

        let node = doc.lookup("Plain").unwrap();
        assert_eq!(doc.children(node).len(), 1);
        assert_eq!(doc.text_content(node), "s3cr3t!");
        assert_eq!(
            doc.element(node).unwrap().attribute("style"),
            Some("fill:blue;stroke:none")
        );
    }

    #[test]
    fn test_update_is_idempotent() {
        let mut doc = parse();
        update_field(&mut doc, "Styled", "Cafe <Free>");
        update_field(&mut doc, "Plain", "pw");
        let once = to_string_pretty(&doc);

        update_field(&mut doc, "Styled", "Cafe <Free>");
        update_field(&mut doc, "Plain", "pw");
        assert_eq!(to_string_pretty(&doc), once);
        assert_eq!(once.matches("stroke:none").count(), 2);
    }

    #[test]
    fn test_missing_field_is_not_fatal() {
        let mut doc = parse();
        let before = to_string_pretty(&doc);
        assert!(!update_field(&mut doc, "WifiNetworkPasswordValue", "x"));
        assert_eq!(to_string_pretty(&doc), before);
    }

    #[test]
    fn test_baseline_in_root_space() {
        let doc = parse();
        let styled = TextField::resolve(&doc, "Styled").unwrap();
        assert_eq!(styled.baseline(&doc), Some((150.0, 100.0)));
        let plain = TextField::resolve(&doc, "Plain").unwrap();
        assert_eq!(plain.baseline(&doc), Some((10.0, 145.0)));
    }
}
