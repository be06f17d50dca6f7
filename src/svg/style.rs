//! Inline `style` attribute handling

/// Declaration appended to every rewritten field style.
pub const STROKE_DISABLED: &str = "stroke:none";

/// Split a style string into `(property, value)` declarations.
pub fn declarations(style: &str) -> Vec<(&str, &str)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (property, value) = decl.split_once(':')?;
            let property = property.trim();
            if property.is_empty() {
                return None;
            }
            Some((property, value.trim()))
        })
        .collect()
}

/// Remove every stroke-related declaration and append an explicit
/// `stroke:none`. Fill, font and all other declarations keep their order
/// and values.
pub fn disable_stroke(style: &str) -> String {
    let mut kept: Vec<String> = declarations(style)
        .into_iter()
        .filter(|(property, _)| !property.to_ascii_lowercase().starts_with("stroke"))
        .map(|(property, value)| format!("{property}:{value}"))
        .collect();
    kept.push(STROKE_DISABLED.to_string());
    kept.join(";")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inkscape_style() {
        let style = "font-size:16px;font-family:'DejaVu Sans';fill:#1a1a1a;stroke:#000000;stroke-width:0.26;stroke-linejoin:round";
        assert_eq!(
            disable_stroke(style),
            "font-size:16px;font-family:'DejaVu Sans';fill:#1a1a1a;stroke:none"
        );
    }

    #[test]
    fn test_without_stroke() {
        assert_eq!(disable_stroke("fill:red"), "fill:red;stroke:none");
        assert_eq!(disable_stroke(""), "stroke:none");
        assert_eq!(disable_stroke(" ; ;"), "stroke:none");
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let once = disable_stroke("fill:#fff; stroke : blue ;font-weight:bold");
        assert_eq!(once, "fill:#fff;font-weight:bold;stroke:none");
        assert_eq!(disable_stroke(&once), once);
    }

    #[test]
    fn test_only_explicit_disable_survives() {
        let inputs = [
            "stroke:none",
            "STROKE-OPACITY:1;fill:none",
            "stroke-dasharray:2,2;stroke:red;stroke:green",
            "font:12px serif",
        ];
        for input in inputs {
            let rewritten = disable_stroke(input);
            let strokes: Vec<_> = declarations(&rewritten)
                .into_iter()
                .filter(|(p, _)| p.to_ascii_lowercase().starts_with("stroke"))
                .collect();
            assert_eq!(strokes, vec![("stroke", "none")], "input: {input}");
        }
    }
}
