//! QR symbol encoder

use crate::error::{Error, Result};
use crate::qr::{ErrorCorrection, ScanSymbol};
use qrcode::QrCode;

/// Default length of one module in template units.
pub const DEFAULT_MODULE_SCALE: f64 = 4.0;

/// QR symbol encoder
pub struct SymbolEncoder {
    /// Error correction level
    level: ErrorCorrection,
    /// Document units per module
    module_scale: f64,
}

impl SymbolEncoder {
    /// Create a new encoder with default settings (High ECC)
    pub fn new() -> Self {
        Self {
            level: ErrorCorrection::High,
            module_scale: DEFAULT_MODULE_SCALE,
        }
    }

    /// Create a new encoder with a specific error correction level
    pub fn with_level(level: ErrorCorrection) -> Self {
        Self {
            level,
            ..Self::new()
        }
    }

    /// Override the per-module scale factor
    pub fn module_scale(mut self, scale: f64) -> Self {
        self.module_scale = scale;
        self
    }

    /// Encode payload text into a scan symbol.
    ///
    /// Fails with [`Error::Encoding`] when the payload exceeds the capacity of
    /// the largest symbol version at the configured level.
    pub fn encode(&self, payload: &str) -> Result<ScanSymbol> {
        if !(self.module_scale.is_finite() && self.module_scale > 0.0) {
            return Err(Error::Encoding(format!(
                "module scale must be positive, got {}",
                self.module_scale
            )));
        }

        let code = QrCode::with_error_correction_level(payload.as_bytes(), self.level.ec_level())
            .map_err(|e| {
                Error::Encoding(format!(
                    "{e} ({} bytes at level {:?})",
                    payload.len(),
                    self.level
                ))
            })?;

        tracing::debug!(
            version = ?code.version(),
            modules = code.width(),
            level = ?self.level,
            "Synthesized scan symbol"
        );

        Ok(ScanSymbol::from_colors(
            code.width(),
            &code.to_colors(),
            self.module_scale,
        ))
    }
}

impl Default for SymbolEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_payload() {
        let symbol = SymbolEncoder::new()
            .encode("WIFI:T:WPA;S:HomeNet;P:s3cr3t!;;")
            .unwrap();
        assert!(symbol.module_count() >= 21);
        assert_eq!(symbol.scale(), DEFAULT_MODULE_SCALE);
        // finder pattern corner is always dark
        assert!(symbol.is_dark(0, 0));
    }

    #[test]
    fn test_payload_too_long() {
        let payload = "x".repeat(1400);
        let err = SymbolEncoder::with_level(ErrorCorrection::High)
            .encode(&payload)
            .unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
    }

    #[test]
    fn test_lower_level_fits_more() {
        let payload = "x".repeat(1400);
        assert!(
            SymbolEncoder::with_level(ErrorCorrection::Low)
                .encode(&payload)
                .is_ok()
        );
    }

    #[test]
    fn test_invalid_scale() {
        let err = SymbolEncoder::new().module_scale(0.0).encode("x").unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
    }
}
