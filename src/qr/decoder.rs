//! Read-back check of synthesized symbols using rqrr

use crate::error::{Error, Result};
use crate::payload::{self, Credential};
use crate::qr::ScanSymbol;
use image::{GrayImage, Luma};

/// Light modules around the symbol when rasterizing, as scanners expect.
const QUIET_ZONE: usize = 4;

/// Rasterizes a symbol and decodes it again
pub struct SymbolVerifier {
    pixels_per_module: u32,
}

impl SymbolVerifier {
    /// Create a verifier with default settings
    pub fn new() -> Self {
        Self {
            pixels_per_module: 4,
        }
    }

    /// Render the module matrix to a grayscale image with a quiet zone
    pub fn rasterize(&self, symbol: &ScanSymbol) -> GrayImage {
        let ppm = self.pixels_per_module.max(1);
        let side = ((symbol.module_count() + 2 * QUIET_ZONE) as u32) * ppm;

        GrayImage::from_fn(side, side, |px, py| {
            let mx = (px / ppm) as usize;
            let my = (py / ppm) as usize;
            let dark = mx >= QUIET_ZONE
                && my >= QUIET_ZONE
                && symbol.is_dark(mx - QUIET_ZONE, my - QUIET_ZONE);
            if dark { Luma([0u8]) } else { Luma([255u8]) }
        })
    }

    /// Decode the text carried by a symbol
    pub fn decode(&self, symbol: &ScanSymbol) -> Result<String> {
        let mut prepared = rqrr::PreparedImage::prepare(self.rasterize(symbol));
        let grids = prepared.detect_grids();

        let grid = grids
            .first()
            .ok_or_else(|| Error::SymbolVerification("no symbol detected".to_string()))?;

        match grid.decode() {
            Ok((meta, content)) => {
                tracing::debug!(
                    "Read back symbol: version={:?}, ecc_level={:?}, length={}",
                    meta.version,
                    meta.ecc_level,
                    content.len()
                );
                Ok(content)
            }
            Err(e) => Err(Error::SymbolVerification(format!("decode failed: {:?}", e))),
        }
    }

    /// Check that a symbol reads back to exactly these credentials
    pub fn verify(&self, symbol: &ScanSymbol, expected: &Credential) -> Result<()> {
        let text = self.decode(symbol)?;
        match payload::parse(&text) {
            Some(found) if &found == expected => Ok(()),
            Some(found) => Err(Error::SymbolVerification(format!(
                "symbol carries network '{}' instead of '{}'",
                found.network_name, expected.network_name
            ))),
            None => Err(Error::SymbolVerification(format!(
                "symbol text is not a WIFI payload: {text}"
            ))),
        }
    }
}

impl Default for SymbolVerifier {
    fn default() -> Self {
        Self::new()
    }
}
