//! Configuration loading and parsing
//!
//! An optional `config.toml` supplies output defaults and the decoder's I/O
//! settings. Command-line flags override anything set here.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use vital_decoder::DecoderConfig;

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub decoder: DecoderConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Single-line JSON
    #[serde(default)]
    pub compact: bool,
    /// Records printed per track, 0 for all
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,
}

fn default_max_samples() -> usize {
    3
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            compact: false,
            max_samples: default_max_samples(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vital_decoder::ReaderKind;

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
            [output]
            format = "json"
            compact = true

            [decoder]
            reader = "simple"
            buffer_capacity = 4096
        "#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.compact);
        assert_eq!(config.output.max_samples, 3);
        assert_eq!(config.decoder.reader, ReaderKind::Simple);
        assert_eq!(config.decoder.buffer_capacity, Some(4096));
        assert_eq!(config.decoder.max_packet_len, 100 * 1024 * 1024);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.decoder.reader, ReaderKind::Buffered);
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[output]\nmax_samples = 0\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.output.max_samples, 0);
        assert_eq!(config.output.format, OutputFormat::Text);
    }

    #[test]
    fn test_load_config_rejects_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        fs::write(&path, "[output]\nformat = \"parquet\"\n").unwrap();
        assert!(load_config(&path).is_err());

        fs::write(&path, "[decoder]\nreader = \"mmap\"\n").unwrap();
        assert!(load_config(&path).is_err());

        assert!(load_config(&dir.path().join("missing.toml")).is_err());
    }
}
