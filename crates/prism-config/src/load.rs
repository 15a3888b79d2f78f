use std::path::Path;

use prism_core::AggregatorRegistry;
use serde_json::Value;

use crate::errors::{ConfigError, Result};
use crate::validate::{ValidatedConfig, load_config};

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Parse a configuration document into a JSON value.
pub fn parse_document(text: &str, format: ConfigFormat) -> Result<Value> {
    let value = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(text)?,
        ConfigFormat::Json => serde_json::from_str(text)?,
        ConfigFormat::Toml => toml::from_str(text)?,
    };
    Ok(value)
}

/// Read and parse a document, picking the format from the extension.
pub fn read_document(path: &Path) -> Result<Value> {
    let format = ConfigFormat::from_path(path)?;
    let text = std::fs::read_to_string(path)?;
    parse_document(&text, format)
}

/// Read, validate and compile a configuration file.
pub fn load_config_file(path: &Path, registry: &AggregatorRegistry) -> Result<ValidatedConfig> {
    let document = read_document(path)?;
    load_config(&document, registry).map_err(ConfigError::Invalid)
}
