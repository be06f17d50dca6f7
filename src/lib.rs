//! wificard - printable WiFi join cards
//!
//! Fills the network name and password fields of an SVG card template,
//! draws a scannable `WIFI:` QR code as vector paths under them and grows
//! the card so everything fits.
//!
//! # Features
//!
//! - **Template fields**: labelled `<text>` nodes are rewritten in place, styling kept
//! - **Scan symbol**: WPA join payload encoded at a high error correction level
//! - **Vector output**: the symbol is spliced as a single `<path>`, no raster images
//! - **Self-check**: the symbol is rasterized and decoded back before it is written
//! - **PDF**: optional downstream conversion of the finished card
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! fn main() -> wificard::Result<()> {
//!     let written = wificard::generate("HomeNet", "s3cr3t!", Path::new("output/home.svg"))?;
//!     println!("Card written to {}", written.display());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs, rust_2024_compatibility)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod card;
pub mod config;
pub mod convert;
pub mod error;
pub mod logging;
pub mod output;
pub mod payload;
pub mod qr;
pub mod svg;

// Re-exports for convenience
pub use error::{Error, Result};

pub use card::{
    CardGenerator, CardLayout, FieldOutcome, GenerationReport, RenderedCard, composite, generate,
    update_field,
};
pub use config::{
    CardConfig, LabelOptions, LayoutGeometry, LogRotation, LoggingOptions, OutputOptions,
    SymbolOptions, TemplateOptions,
};
pub use convert::{PdfConverter, SvgToPdf};
pub use payload::{Credential, encode};
pub use qr::{ErrorCorrection, ScanSymbol, SymbolEncoder, SymbolVerifier, synthesize};
pub use svg::{Document, Viewport};
