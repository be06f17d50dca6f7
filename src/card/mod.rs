//! Card assembly: template fields, scan symbol and layout in one pass

pub mod field;
pub mod layout;

pub use field::{TextField, update_field};
pub use layout::{CODE_GROUP_ID, CardLayout, INSTRUCTION_LABEL_ID, composite, plan};

use crate::config::CardConfig;
use crate::error::{Error, Result};
use crate::output::write_atomic;
use crate::payload::Credential;
use crate::qr::{ErrorCorrection, ScanSymbol, SymbolEncoder, SymbolVerifier};
use crate::svg::{self, Document};

/// Versioned card template shipped inside the binary
pub const BUNDLED_TEMPLATE: &str = include_str!("../../templates/wifi-card.v1.svg");
use serde::Serialize;
use std::path::{Path, PathBuf};

/// What happened to one template field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldOutcome {
    /// Text replaced
    Updated,
    /// Label not present; the field was left as in the template
    Missing,
}

/// Summary of one generation
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    /// Written file, once the card is on disk
    pub output: Option<PathBuf>,
    /// Template file the card was built from, `None` for the bundled one
    pub template: Option<PathBuf>,
    /// Outcome per field label
    pub fields: Vec<(String, FieldOutcome)>,
    /// Payload length in bytes
    pub payload_bytes: usize,
    /// Modules along one side of the symbol
    pub modules: usize,
    /// Error correction level of the symbol
    pub error_correction: ErrorCorrection,
    /// Final placement of the appended content
    pub layout: CardLayout,
}

impl GenerationReport {
    /// Labels of the fields that were not found
    pub fn missing_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, outcome)| *outcome == FieldOutcome::Missing)
            .map(|(label, _)| label.as_str())
            .collect()
    }
}

/// A card rendered in memory
#[derive(Debug, Clone)]
pub struct RenderedCard {
    /// Serialized SVG document
    pub svg: String,
    /// Generation summary
    pub report: GenerationReport,
}

/// Builds cards from a template according to a [`CardConfig`]
#[derive(Debug, Clone, Default)]
pub struct CardGenerator {
    config: CardConfig,
}

impl CardGenerator {
    /// Create a generator with the given configuration
    pub fn new(config: CardConfig) -> Self {
        Self { config }
    }

    /// Configuration in use
    pub fn config(&self) -> &CardConfig {
        &self.config
    }

    /// Run every step in memory and return the serialized card.
    pub fn render(&self, credential: &Credential) -> Result<RenderedCard> {
        let template = &self.config.template;
        let mut document = match &template.path {
            Some(path) => Document::load(path, &template.label_attribute)?,
            None => Document::parse(BUNDLED_TEMPLATE, &template.label_attribute)?,
        };
        let original = document.viewport()?;

        let fields = [
            (&template.name_field, &credential.network_name),
            (&template.password_field, &credential.password),
        ]
        .into_iter()
        .map(|(label, text)| {
            let outcome = if update_field(&mut document, label, text) {
                FieldOutcome::Updated
            } else {
                FieldOutcome::Missing
            };
            (label.clone(), outcome)
        })
        .collect::<Vec<_>>();

        let payload = credential.payload();
        let symbol = self
            .synthesize(&payload, credential)
            .map_err(|e| Error::FieldEncoding(Box::new(e)))?;

        let anchor = layout::content_anchor(
            &document,
            &[template.name_field.as_str(), template.password_field.as_str()],
            original,
        );
        let placed = composite(
            &mut document,
            &symbol,
            &self.config.label.text,
            anchor,
            &self.config.layout,
        )?;

        Ok(RenderedCard {
            svg: svg::to_string_pretty(&document),
            report: GenerationReport {
                output: None,
                template: template.path.clone(),
                fields,
                payload_bytes: payload.len(),
                modules: symbol.module_count(),
                error_correction: self.config.symbol.error_correction,
                layout: placed,
            },
        })
    }

    /// Render a card and write it to `output_path`.
    ///
    /// The file is written to a temporary sibling and renamed into place, so
    /// a failure at any step leaves no output behind.
    pub fn generate(&self, credential: &Credential, output_path: &Path) -> Result<GenerationReport> {
        let RenderedCard { svg, mut report } = self.render(credential)?;
        write_atomic(output_path, svg.as_bytes())?;
        tracing::info!("Generated SVG card: {}", output_path.display());

        report.output = Some(output_path.to_path_buf());
        Ok(report)
    }

    fn synthesize(&self, payload: &str, credential: &Credential) -> Result<ScanSymbol> {
        let options = &self.config.symbol;
        let symbol = SymbolEncoder::with_level(options.error_correction)
            .module_scale(options.module_scale)
            .encode(payload)?;
        if options.verify {
            SymbolVerifier::new().verify(&symbol, credential)?;
        }
        Ok(symbol)
    }
}

/// Generate a card with the default configuration and return the written path.
pub fn generate(name: &str, password: &str, output_path: &Path) -> Result<PathBuf> {
    let report = CardGenerator::default().generate(&Credential::new(name, password), output_path)?;
    Ok(report.output.unwrap_or_else(|| output_path.to_path_buf()))
}
