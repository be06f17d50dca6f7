//! Conversion of generated cards to PDF

use crate::error::{Error, Result};
use crate::output::write_atomic;
use std::path::{Path, PathBuf};
use svg2pdf::usvg;

/// Renders a vector document into a paginated document
pub trait PdfConverter {
    /// Convert the SVG at `svg_path`, returning the path of the written PDF
    fn convert(&self, svg_path: &Path) -> Result<PathBuf>;
}

/// PDF path written next to an SVG: same stem, `.pdf` extension.
pub fn pdf_path_for(svg_path: &Path) -> PathBuf {
    svg_path.with_extension("pdf")
}

/// 1:1 rendering through `svg2pdf`
pub struct SvgToPdf {
    load_system_fonts: bool,
}

impl SvgToPdf {
    /// Create a converter that resolves text with the system fonts
    pub fn new() -> Self {
        Self {
            load_system_fonts: true,
        }
    }

    /// Skip loading system fonts; text without a usable font is dropped
    pub fn without_system_fonts() -> Self {
        Self {
            load_system_fonts: false,
        }
    }

    /// Render SVG text to PDF bytes. Relative references resolve against `resources_dir`.
    pub fn render(&self, svg: &str, resources_dir: Option<&Path>) -> Result<Vec<u8>> {
        let mut options = usvg::Options {
            resources_dir: resources_dir.map(Path::to_path_buf),
            ..usvg::Options::default()
        };
        if self.load_system_fonts {
            options.fontdb_mut().load_system_fonts();
        }

        let tree = usvg::Tree::from_str(svg, &options).map_err(|e| Error::Conversion(e.to_string()))?;
        svg2pdf::to_pdf(
            &tree,
            svg2pdf::ConversionOptions::default(),
            svg2pdf::PageOptions::default(),
        )
        .map_err(|e| Error::Conversion(e.to_string()))
    }
}

impl Default for SvgToPdf {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfConverter for SvgToPdf {
    fn convert(&self, svg_path: &Path) -> Result<PathBuf> {
        if !svg_path.exists() {
            return Err(Error::InputNotFound(svg_path.to_path_buf()));
        }
        let svg = std::fs::read_to_string(svg_path)?;
        let pdf = self.render(&svg, svg_path.parent())?;

        let pdf_path = pdf_path_for(svg_path);
        write_atomic(&pdf_path, &pdf)?;
        tracing::info!("Generated PDF card: {}", pdf_path.display());
        Ok(pdf_path)
    }
}
