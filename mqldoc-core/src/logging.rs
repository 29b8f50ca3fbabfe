//! Structured logging with tracing
//!
//! The library only emits `tracing` events. Applications that want them on
//! stdout can install a subscriber with [`init_logging`].

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,

    /// Enable JSON format output
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Parse log level from string
    pub fn parse_level(&self) -> Result<Level> {
        match self.level.to_uppercase().as_str() {
            "ERROR" => Ok(Level::ERROR),
            "WARN" => Ok(Level::WARN),
            "INFO" => Ok(Level::INFO),
            "DEBUG" => Ok(Level::DEBUG),
            "TRACE" => Ok(Level::TRACE),
            other => Err(anyhow!("Unknown log level: {}", other)),
        }
    }
}

/// Install a global subscriber for the configured level and format.
///
/// Fails if the level is unknown or a global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let level = config.parse_level()?;
    let env_filter = EnvFilter::new(level.as_str().to_lowercase());
    let subscriber = Registry::default().with(env_filter);

    if config.json_format {
        let json_layer = fmt::layer().json().with_current_span(true).with_target(true);
        subscriber
            .with(json_layer)
            .try_init()
            .context("Failed to install JSON log subscriber")?;
    } else {
        let fmt_layer = fmt::layer().with_target(true).compact();
        subscriber
            .with(fmt_layer)
            .try_init()
            .context("Failed to install log subscriber")?;
    }

    tracing::info!(
        "Logging initialized: level={}, json={}",
        config.level,
        config.json_format
    );

    Ok(())
}
