//! Scan symbol synthesis and self-checking
//!
//! This module turns a payload into a QR matrix, emits it as a vector path
//! fragment and, optionally, reads a rasterized copy back to make sure the
//! printed card will scan.

mod decoder;
mod encoder;

pub use decoder::SymbolVerifier;
pub use encoder::{DEFAULT_MODULE_SCALE, SymbolEncoder};

use crate::error::Result;
use qrcode::{Color, EcLevel};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::str::FromStr;

/// Error-correction tier of the symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ErrorCorrection {
    /// ~7% recovery
    #[serde(rename = "L")]
    Low,
    /// ~15% recovery
    #[serde(rename = "M")]
    Medium,
    /// ~25% recovery
    #[serde(rename = "Q")]
    Quartile,
    /// ~30% recovery, best for printed media
    #[default]
    #[serde(rename = "H")]
    High,
}

impl ErrorCorrection {
    /// Parse a level identifier (`L`, `M`, `Q`, `H` or the long names), case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "l" | "low" => Some(Self::Low),
            "m" | "medium" => Some(Self::Medium),
            "q" | "quartile" => Some(Self::Quartile),
            "h" | "high" => Some(Self::High),
            _ => None,
        }
    }

    pub(crate) fn ec_level(self) -> EcLevel {
        match self {
            Self::Low => EcLevel::L,
            Self::Medium => EcLevel::M,
            Self::Quartile => EcLevel::Q,
            Self::High => EcLevel::H,
        }
    }
}

impl FromStr for ErrorCorrection {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| {
            format!("Unsupported error correction level '{value}', expected L, M, Q or H")
        })
    }
}

/// A square matrix of dark/light modules with its rendering scale
#[derive(Debug, Clone, PartialEq)]
pub struct ScanSymbol {
    width: usize,
    dark: Vec<bool>,
    scale: f64,
}

impl ScanSymbol {
    pub(crate) fn from_colors(width: usize, colors: &[Color], scale: f64) -> Self {
        Self {
            width,
            dark: colors.iter().map(|c| *c == Color::Dark).collect(),
            scale,
        }
    }

    /// Number of modules along one side
    pub fn module_count(&self) -> usize {
        self.width
    }

    /// Length of one module in document units
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Side length of the rendered symbol in document units (no border)
    pub fn size(&self) -> f64 {
        self.width as f64 * self.scale
    }

    /// Whether the module at column `x`, row `y` is dark
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.width && self.dark[y * self.width + x]
    }

    /// Path data tracing every horizontal run of dark modules as a line
    /// through the middle of its row. Coordinates are in symbol-local space.
    pub fn path_data(&self) -> String {
        let mut d = String::new();
        for y in 0..self.width {
            let mut x = 0;
            while x < self.width {
                if !self.is_dark(x, y) {
                    x += 1;
                    continue;
                }
                let start = x;
                while x < self.width && self.is_dark(x, y) {
                    x += 1;
                }
                let _ = write!(
                    d,
                    "M{},{}h{}",
                    format_number(start as f64 * self.scale),
                    format_number((y as f64 + 0.5) * self.scale),
                    format_number((x - start) as f64 * self.scale),
                );
            }
        }
        d
    }

    /// Style of the path primitives: no fill, strokes one module wide
    pub fn path_style(&self) -> String {
        format!(
            "fill:none;stroke:#000000;stroke-width:{};stroke-linecap:butt",
            format_number(self.scale)
        )
    }
}

/// Encode a payload into a scan symbol at the given error-correction level
/// using the default module scale.
///
/// Returns the symbol (which renders the vector fragment) and its module count.
pub fn synthesize(payload: &str, level: ErrorCorrection) -> Result<(ScanSymbol, usize)> {
    let symbol = SymbolEncoder::with_level(level).encode(payload)?;
    let modules = symbol.module_count();
    Ok((symbol, modules))
}

/// Format a coordinate without trailing zeros.
pub(crate) fn format_number(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard_row() -> ScanSymbol {
        // 3x3: row 0 = D D L, row 1 = L L L, row 2 = D L D
        let colors = [
            Color::Dark,
            Color::Dark,
            Color::Light,
            Color::Light,
            Color::Light,
            Color::Light,
            Color::Dark,
            Color::Light,
            Color::Dark,
        ];
        ScanSymbol::from_colors(3, &colors, 2.0)
    }

    #[test]
    fn test_path_data_runs() {
        let symbol = checkerboard_row();
        assert_eq!(symbol.path_data(), "M0,1h4M0,5h2M4,5h2");
        assert_eq!(symbol.size(), 6.0);
    }

    #[test]
    fn test_path_style_is_uncolored_fill() {
        let symbol = checkerboard_row();
        assert!(symbol.path_style().starts_with("fill:none;"));
        assert!(symbol.path_style().contains("stroke-width:2"));
    }

    #[test]
    fn test_error_correction_parse() {
        assert_eq!(ErrorCorrection::parse("h"), Some(ErrorCorrection::High));
        assert_eq!(ErrorCorrection::parse("Quartile"), Some(ErrorCorrection::Quartile));
        assert!("X".parse::<ErrorCorrection>().is_err());
        assert_eq!(ErrorCorrection::default(), ErrorCorrection::High);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(4.0), "4");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(-20.0), "-20");
        assert_eq!(format_number(1.0 / 3.0), "0.333");
    }

    #[test]
    fn test_synthesize_module_count() {
        let (symbol, modules) =
            synthesize("WIFI:T:WPA;S:HomeNet;P:s3cr3t!;;", ErrorCorrection::High).unwrap();
        assert_eq!(modules, symbol.module_count());
        assert_eq!((modules - 17) % 4, 0);
    }
}
