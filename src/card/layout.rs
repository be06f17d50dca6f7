//! Placement of the scan symbol and instruction label

use crate::card::field::TextField;
use crate::config::LayoutGeometry;
use crate::error::Result;
use crate::qr::{ScanSymbol, format_number};
use crate::svg::{Document, Element, Viewport};
use serde::Serialize;

/// Label of the group holding the symbol paths
pub const CODE_GROUP_ID: &str = "WifiQrCode";
/// Label of the instruction text under the symbol
pub const INSTRUCTION_LABEL_ID: &str = "WifiScanInstructions";

/// Where everything goes, computed before the document is touched
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardLayout {
    /// Enlarged viewport
    #[serde(serialize_with = "serialize_viewport")]
    pub viewport: Viewport,
    /// Top-left corner of the symbol
    pub code_origin: (f64, f64),
    /// Side length of the symbol
    pub code_size: f64,
    /// Horizontal center of the label
    pub label_x: f64,
    /// Baseline of every label line, top to bottom
    pub label_baselines: Vec<f64>,
}

/// Compute the layout for a symbol of `code_size` placed under `anchor_y`.
///
/// The viewport grows by `side_margin` on each side and, when needed,
/// downwards; it never shrinks.
pub fn plan(
    original: Viewport,
    anchor_y: f64,
    code_size: f64,
    label_lines: usize,
    geometry: &LayoutGeometry,
) -> CardLayout {
    let code_top = anchor_y + geometry.code_top_offset;
    let code_x = original.center_x() - code_size / 2.0;

    let label_top = code_top + code_size + geometry.label_gap;
    let label_baselines: Vec<f64> = (0..label_lines)
        .map(|line| label_top + geometry.label_font_size + line as f64 * geometry.label_line_height)
        .collect();
    let content_bottom = label_baselines
        .last()
        .copied()
        .unwrap_or(code_top + code_size)
        + geometry.bottom_margin;

    let viewport = Viewport {
        x: original.x - geometry.side_margin,
        y: original.y,
        width: original.width + 2.0 * geometry.side_margin,
        height: original.height.max(content_bottom - original.y),
    };

    CardLayout {
        viewport,
        code_origin: (code_x, code_top),
        code_size,
        label_x: original.center_x(),
        label_baselines,
    }
}

/// Lowest baseline among the fields that exist, or the bottom of the
/// viewport when none do.
pub fn content_anchor(document: &Document, field_ids: &[&str], viewport: Viewport) -> f64 {
    field_ids
        .iter()
        .filter_map(|id| TextField::resolve(document, id))
        .filter_map(|field| field.baseline(document))
        .map(|(_, y)| y)
        .reduce(f64::max)
        .unwrap_or_else(|| viewport.bottom())
}

/// Append the symbol and the instruction label below `anchor_y`, then grow
/// the viewport to fit them. Existing nodes are not moved.
pub fn composite(
    document: &mut Document,
    symbol: &ScanSymbol,
    instruction_label: &str,
    anchor_y: f64,
    geometry: &LayoutGeometry,
) -> Result<CardLayout> {
    let original = document.viewport()?;
    let lines: Vec<&str> = instruction_label.lines().collect();
    let layout = plan(original, anchor_y, symbol.size(), lines.len(), geometry);
    let root = document.root();

    let (code_x, code_y) = layout.code_origin;
    let group = labelled(document, "g", CODE_GROUP_ID).with_attribute(
        "transform",
        format!(
            "translate({},{})",
            format_number(code_x),
            format_number(code_y)
        ),
    );
    let group = document.append_element(root, group);
    document.append_element(
        group,
        Element::new("path")
            .with_attribute("d", symbol.path_data())
            .with_attribute("style", symbol.path_style()),
    );

    if !lines.is_empty() {
        let label_x = format_number(layout.label_x);
        let label = labelled(document, "text", INSTRUCTION_LABEL_ID)
            .with_attribute("x", label_x.clone())
            .with_attribute("y", format_number(layout.label_baselines[0]))
            .with_attribute(
                "style",
                format!(
                    "font-size:{}px;font-family:{};text-anchor:middle;fill:#000000;stroke:none",
                    format_number(geometry.label_font_size),
                    geometry.label_font_family
                ),
            );
        let label = document.append_element(root, label);
        for (line, baseline) in lines.iter().zip(&layout.label_baselines) {
            let span = document.append_element(
                label,
                Element::new("tspan")
                    .with_attribute("x", label_x.clone())
                    .with_attribute("y", format_number(*baseline)),
            );
            document.append_text(span, line);
        }
    }

    document.set_viewport(layout.viewport)?;
    tracing::debug!(
        before = ?original,
        after = ?layout.viewport,
        code_origin = ?layout.code_origin,
        "Composited scan symbol"
    );
    Ok(layout)
}

/// New element carrying `label` both as `id` and under the document's label attribute.
fn labelled(document: &Document, name: &str, label: &str) -> Element {
    let element = Element::new(name).with_attribute("id", label);
    match document.label_attribute() {
        "id" => element,
        other => element.with_attribute(other, label),
    }
}

fn serialize_viewport<S>(viewport: &Viewport, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    [viewport.x, viewport.y, viewport.width, viewport.height].serialize(serializer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::SymbolEncoder;
    use crate::svg::NodeKind;

    const TEMPLATE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="300" height="180" viewBox="0 0 300 180">
  <rect id="Background" x="0" y="0" width="300" height="180"/>
  <text id="Name" x="20" y="95"><tspan style="fill:#000">name</tspan></text>
  <text id="Password" x="20" y="145">pw</text>
</svg>"##;

    fn original() -> Viewport {
        Viewport {
            x: 0.0,
            y: 0.0,
            width: 300.0,
            height: 180.0,
        }
    }

    #[test]
    fn test_plan_defaults() {
        let geometry = LayoutGeometry::default();
        let layout = plan(original(), 145.0, 132.0, 2, &geometry);

        assert_eq!(layout.viewport.x, -20.0);
        assert_eq!(layout.viewport.width, 340.0);
        assert_eq!(layout.code_origin, (84.0, 169.0));
        assert_eq!(layout.label_x, 150.0);
        assert_eq!(layout.label_baselines, vec![326.0, 341.0]);
        assert_eq!(layout.viewport.height, 361.0);
    }

    #[test]
    fn test_plan_never_shrinks() {
        let geometry = LayoutGeometry::default();
        let tall = Viewport {
            height: 1000.0,
            ..original()
        };
        let layout = plan(tall, 10.0, 20.0, 2, &geometry);
        assert_eq!(layout.viewport.height, 1000.0);

        for anchor in [0.0, 50.0, 180.0, 400.0] {
            for size in [0.0, 84.0, 300.0] {
                let layout = plan(original(), anchor, size, 2, &geometry);
                assert!(layout.viewport.width >= 300.0);
                assert!(layout.viewport.height >= 180.0);
            }
        }
    }

    #[test]
    fn test_plan_without_label() {
        let geometry = LayoutGeometry::default();
        let layout = plan(original(), 145.0, 132.0, 0, &geometry);
        assert!(layout.label_baselines.is_empty());
        assert_eq!(layout.viewport.height, 169.0 + 132.0 + 20.0);
    }

    #[test]
    fn test_content_anchor() {
        let doc = Document::parse(TEMPLATE, "id").unwrap();
        let viewport = doc.viewport().unwrap();
        assert_eq!(content_anchor(&doc, &["Name", "Password"], viewport), 145.0);
        assert_eq!(content_anchor(&doc, &["Name", "Missing"], viewport), 95.0);
        assert_eq!(content_anchor(&doc, &["Missing"], viewport), 180.0);
    }

    #[test]
    fn test_composite_appends_and_resizes() {
        let mut doc = Document::parse(TEMPLATE, "id").unwrap();
        let existing: Vec<_> = doc
            .descendants(doc.root())
            .into_iter()
            .skip(1)
            .map(|id| doc.kind(id).clone())
            .collect();

        let symbol = SymbolEncoder::new().encode("WIFI:T:WPA;S:a;P:b;;").unwrap();
        let geometry = LayoutGeometry::default();
        let layout = composite(&mut doc, &symbol, "Scan me\nto join", 145.0, &geometry).unwrap();

        // pre-existing nodes untouched
        let after: Vec<_> = doc
            .descendants(doc.root())
            .into_iter()
            .skip(1)
            .take(existing.len())
            .map(|id| doc.kind(id).clone())
            .collect();
        assert_eq!(after, existing);

        let root = doc.element(doc.root()).unwrap();
        assert_eq!(root.attribute("width"), Some("340"));
        let viewport = doc.viewport().unwrap();
        assert_eq!(viewport, layout.viewport);

        let group = doc.lookup(CODE_GROUP_ID).unwrap();
        let size = symbol.size();
        assert_eq!(
            doc.element(group).unwrap().attribute("transform"),
            Some(format!("translate({},169)", format_number(150.0 - size / 2.0)).as_str())
        );
        let path = doc.child_elements(group).next().unwrap();
        assert!(doc.element(path).unwrap().attribute("d").unwrap().starts_with("M0,2h"));

        let label = doc.lookup(INSTRUCTION_LABEL_ID).unwrap();
        let spans: Vec<_> = doc.child_elements(label).collect();
        assert_eq!(spans.len(), 2);
        assert_eq!(doc.text_content(spans[0]), "Scan me");
        assert_eq!(doc.text_content(spans[1]), "to join");
        assert!(
            doc.children(label)
                .iter()
                .all(|c| !matches!(doc.kind(*c), NodeKind::Text(_)))
        );
    }

    #[test]
    fn test_composite_with_custom_label_attribute() {
        let mut doc = Document::parse(TEMPLATE, "inkscape:label").unwrap();
        let symbol = SymbolEncoder::new().encode("x").unwrap();
        composite(&mut doc, &symbol, "one line", 145.0, &LayoutGeometry::default()).unwrap();
        assert!(doc.lookup(CODE_GROUP_ID).is_some());
        assert!(doc.lookup(INSTRUCTION_LABEL_ID).is_some());
    }
}
