//! wificard runtime configuration handling

use crate::error::{Error, Result};
use crate::qr::ErrorCorrection;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration structure persisted to disk or environment
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CardConfig {
    /// Template resource and field identifiers
    pub template: TemplateOptions,
    /// Scan symbol options
    pub symbol: SymbolOptions,
    /// Placement of the appended content
    pub layout: LayoutGeometry,
    /// Instruction label below the code
    pub label: LabelOptions,
    /// Output location
    pub output: OutputOptions,
    /// Logging configuration
    pub logging: LoggingOptions,
}

impl CardConfig {
    /// Load configuration from an explicit path or fall back to discovered defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = explicit_path {
            Self::from_file(path)?
        } else if let Some(path) = Self::discover_file()? {
            tracing::info!("Using configuration file: {}", path.display());
            Self::from_file(&path)?
        } else {
            tracing::debug!("No wificard.toml / wificard.yaml found, using defaults");
            Self::default()
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Attempt to locate a configuration file in common locations.
    fn discover_file() -> Result<Option<PathBuf>> {
        let cwd =
            env::current_dir().map_err(|e| Error::Config(format!("Failed to read cwd: {e}")))?;
        for candidate in ["wificard.toml", "wificard.yaml", "wificard.yml"] {
            let path = cwd.join(candidate);
            if path.exists() {
                return Ok(Some(path));
            }
        }

        if let Some(xdg_config) = env::var_os("XDG_CONFIG_HOME") {
            let base = PathBuf::from(xdg_config).join("wificard");
            for candidate in ["config.toml", "config.yaml"] {
                let path = base.join(candidate);
                if path.exists() {
                    return Ok(Some(path));
                }
            }
        }

        Ok(None)
    }

    /// Read configuration from a concrete file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;

        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase()
            .as_str()
        {
            "toml" => toml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse TOML {}: {e}", path.display()))
            }),
            "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse YAML {}: {e}", path.display()))
            }),
            other => Err(Error::Config(format!(
                "Unsupported config format '{}', expected toml/yaml",
                other
            ))),
        }
    }

    /// Apply environment variable overrides after file/default loading.
    fn apply_env_overrides(&mut self) -> Result<()> {
        self.template.apply_env_overrides();
        self.symbol.apply_env_overrides()?;
        self.output.apply_env_overrides();
        self.logging.apply_env_overrides();
        Ok(())
    }
}

/// Which template to load and which labels name its fields
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateOptions {
    /// Template SVG file; the template built into the binary when unset
    pub path: Option<PathBuf>,
    /// Attribute carrying node labels
    pub label_attribute: String,
    /// Label of the network name text field
    pub name_field: String,
    /// Label of the password text field
    pub password_field: String,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            path: None,
            label_attribute: "id".to_string(),
            name_field: "WifiNetworkNameValue".to_string(),
            password_field: "WifiNetworkPasswordValue".to_string(),
        }
    }
}

impl TemplateOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(path) = env::var("WIFICARD_TEMPLATE") {
            self.path = Some(PathBuf::from(path));
        }
    }
}

/// Scan symbol options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolOptions {
    /// Error correction level (`L`, `M`, `Q`, `H`)
    pub error_correction: ErrorCorrection,
    /// Document units per module
    pub module_scale: f64,
    /// Read the symbol back before writing the card
    pub verify: bool,
}

impl Default for SymbolOptions {
    fn default() -> Self {
        Self {
            error_correction: ErrorCorrection::High,
            module_scale: crate::qr::DEFAULT_MODULE_SCALE,
            verify: true,
        }
    }
}

impl SymbolOptions {
    pub(crate) fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(level) = env::var("WIFICARD_EC_LEVEL") {
            self.error_correction = level.parse().map_err(Error::Config)?;
        }
        if let Ok(verify) = env::var("WIFICARD_VERIFY") {
            match verify.to_ascii_lowercase().as_str() {
                "0" | "false" | "off" => self.verify = false,
                "1" | "true" | "on" => self.verify = true,
                _ => {}
            }
        }
        Ok(())
    }
}

/// Fixed geometry used to place the code and label, in template user units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutGeometry {
    /// Added on both the left and the right of the viewport
    pub side_margin: f64,
    /// Gap between the lowest field baseline and the top of the code
    pub code_top_offset: f64,
    /// Gap between the bottom of the code and the top of the label
    pub label_gap: f64,
    /// Label font size
    pub label_font_size: f64,
    /// Distance between label baselines
    pub label_line_height: f64,
    /// Space kept below the label
    pub bottom_margin: f64,
    /// Label font family
    pub label_font_family: String,
}

impl Default for LayoutGeometry {
    fn default() -> Self {
        Self {
            side_margin: 20.0,
            code_top_offset: 24.0,
            label_gap: 14.0,
            label_font_size: 11.0,
            label_line_height: 15.0,
            bottom_margin: 20.0,
            label_font_family: "sans-serif".to_string(),
        }
    }
}

/// Instruction label options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelOptions {
    /// Label text, one line per `\n`
    pub text: String,
}

impl Default for LabelOptions {
    fn default() -> Self {
        Self {
            text: "Scan with your phone camera\nto join the network".to_string(),
        }
    }
}

/// Where generated files land
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputOptions {
    /// Relative output paths are placed under this directory
    pub directory: PathBuf,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
        }
    }
}

impl OutputOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(dir) = env::var("WIFICARD_OUTPUT_DIR") {
            self.directory = PathBuf::from(dir);
        }
    }
}

/// Structured logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingOptions {
    /// Default log level (overridable via `WIFICARD_LOG_LEVEL`)
    pub level: String,
    /// Optional log file path for teeing structured logs
    pub file: Option<PathBuf>,
    /// Force ANSI colors in terminal logging
    pub color: bool,
    /// Optional log rotation strategy applied to `file`
    pub rotation: Option<LogRotation>,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            color: true,
            rotation: None,
        }
    }
}

impl LoggingOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(level) = env::var("WIFICARD_LOG_LEVEL") {
            self.level = level;
        }
        if let Ok(file) = env::var("WIFICARD_LOG_FILE") {
            self.file = Some(PathBuf::from(file));
        }
        if let Ok(color) = env::var("WIFICARD_LOG_COLOR") {
            match color.to_ascii_lowercase().as_str() {
                "0" | "false" | "off" => self.color = false,
                "1" | "true" | "on" => self.color = true,
                _ => {}
            }
        }
        if let Ok(rotation) = env::var("WIFICARD_LOG_ROTATION") {
            if let Some(parsed) = LogRotation::from_str(&rotation) {
                self.rotation = Some(parsed);
            }
        }
    }
}

/// Supported log rotation policies for file sinks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    /// Rotate log files once per hour
    Hourly,
    /// Rotate log files once per day
    Daily,
}

impl LogRotation {
    fn from_str(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "hourly" => Some(Self::Hourly),
            "daily" => Some(Self::Daily),
            _ => None,
        }
    }
}
