//! Configuration for mqldoc
//!
//! This module provides:
//! - Codec limits and logging settings in one TOML-loadable struct
//! - Configuration validation and defaults

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::codec::{CodecConfig, MAX_DOCUMENT_SIZE};
use crate::logging::LoggingConfig;

/// Library configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// BSON codec limits
    pub codec: CodecConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse and validate a TOML configuration
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file, falling back to defaults if it is missing
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Serialize to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.codec.max_document_size == 0 {
            return Err(anyhow::anyhow!("Max document size cannot be 0"));
        }

        if self.codec.max_document_size > MAX_DOCUMENT_SIZE {
            return Err(anyhow::anyhow!(
                "Max document size cannot exceed {} bytes",
                MAX_DOCUMENT_SIZE
            ));
        }

        if self.codec.max_nesting_depth == 0 {
            return Err(anyhow::anyhow!("Max nesting depth cannot be 0"));
        }

        self.logging.parse_level()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.codec.max_document_size, 16 * 1024 * 1024);
        assert_eq!(config.codec.max_nesting_depth, 100);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json_format);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.codec.max_nesting_depth = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.codec.max_document_size = MAX_DOCUMENT_SIZE + 1;
        assert!(config.validate().is_err());

        config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml_str(
            r#"
            [codec]
            max_nesting_depth = 32
            "#,
        )
        .unwrap();

        assert_eq!(config.codec.max_nesting_depth, 32);
        assert_eq!(config.codec.max_document_size, MAX_DOCUMENT_SIZE);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(Config::from_toml_str("[codec\nmax = ").is_err());
        assert!(Config::from_toml_str("[codec]\nmax_document_size = 0").is_err());
    }

    #[test]
    fn test_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("mqldoc.toml");

        // Missing file yields defaults
        assert_eq!(Config::load(&path).unwrap(), Config::default());

        let mut config = Config::default();
        config.codec.max_document_size = 1024;
        config.logging.json_format = true;
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
