//! Gateway configuration
//!
//! Loads and validates the host-side settings of the AS4 gateway from TOML:
//! the server's own address (passed into P-Mode resolution as the responder
//! address hint), the locale used for ebMS error texts, and logging. The
//! engine itself consumes plain values; this crate is the only place that
//! knows where they come from.

use as4gate_protocol::error::Locale;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// The configuration file could not be parsed
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration is syntactically fine but unusable
    #[error("Config validation failed: {0}")]
    Validation(String),

    /// The logging subscriber could not be installed
    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn or error
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format: compact, pretty or json
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Complete gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// The gateway's own address, used as the responder-address hint during
    /// P-Mode resolution
    #[serde(default)]
    pub server_address: Option<String>,
    /// Locale for ebMS error short descriptions
    #[serde(default)]
    pub locale: Locale,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GatewayConfig {
    /// Load and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(address) = self.server_address.as_deref() {
            if address.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "server_address must not be blank when set".into(),
                ));
            }
        }
        if !matches!(
            self.logging.level.to_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            return Err(ConfigError::Validation(format!(
                "Invalid log level: {}",
                self.logging.level
            )));
        }
        if !matches!(self.logging.format.as_str(), "compact" | "pretty" | "json") {
            return Err(ConfigError::Validation(format!(
                "Unknown log format: {}",
                self.logging.format
            )));
        }
        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}

/// Install the global tracing subscriber according to the logging settings
///
/// `RUST_LOG` overrides the configured level when present.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ConfigError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("as4gate={}", config.level.to_lowercase())));

    let result = match config.format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_target(true))
            .try_init(),
        "pretty" => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty().with_target(true))
            .try_init(),
        "compact" => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().compact().with_target(true))
            .try_init(),
        other => {
            return Err(ConfigError::Logging(format!("Unknown log format: {other}")));
        }
    };

    result.map_err(|e| ConfigError::Logging(e.to_string()))
}
