//! Error types for card generation

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using wificard's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for wificard operations
#[derive(Error, Debug)]
pub enum Error {
    /// The template resource does not exist
    #[error("Template not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    /// The template is not a well-formed SVG document
    #[error("Failed to parse template: {0}")]
    TemplateParse(String),

    /// The template root carries no usable viewport
    #[error("Invalid template viewport: {0}")]
    InvalidViewport(String),

    /// The payload does not fit into any symbol version at the requested level
    #[error("Failed to encode scan symbol: {0}")]
    Encoding(String),

    /// Wraps any failure raised while building the scan symbol for a card
    #[error("Failed to encode credentials into the card: {0}")]
    FieldEncoding(#[source] Box<Error>),

    /// The synthesized symbol did not read back to the input credentials
    #[error("Scan symbol verification failed: {0}")]
    SymbolVerification(String),

    /// Writing the output document failed
    #[error("Failed to write {}: {source}", path.display())]
    Serialization {
        /// Destination that could not be written
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The document handed to the converter does not exist
    #[error("Input document not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// The downstream renderer rejected the document
    #[error("Failed to convert to PDF: {0}")]
    Conversion(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Config(format!("JSON error: {}", e))
    }
}

impl From<roxmltree::Error> for Error {
    fn from(e: roxmltree::Error) -> Self {
        Error::TemplateParse(e.to_string())
    }
}
