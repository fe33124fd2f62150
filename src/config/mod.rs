//! Configuration management for rerelease
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Largest accepted `source.max_retries`
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Item source configuration
    pub source: SourceConfig,

    /// Recompute pipeline configuration
    pub pipeline: PipelineConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Summary endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Base URL of the summary endpoint
    pub base_url: String,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Retries for transient failures
    pub max_retries: u32,

    /// User agent string
    pub user_agent: String,
}

/// Recompute pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Quiet period before an address write, in milliseconds
    pub debounce_ms: u64,

    /// Capacity of the snapshot channel
    pub snapshot_buffer: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("http://localhost:3030/api"),
            request_timeout_secs: 30,
            max_retries: 2,
            user_agent: format!("rerelease/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 100,
            snapshot_buffer: 32,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl SourceConfig {
    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl PipelineConfig {
    /// Debounce window as Duration
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let base_url =
            std::env::var("RERELEASE_SOURCE_URL").unwrap_or(defaults.source.base_url);

        let request_timeout_secs = std::env::var("RERELEASE_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.source.request_timeout_secs);

        let max_retries = std::env::var("RERELEASE_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(defaults.source.max_retries);

        let user_agent =
            std::env::var("RERELEASE_USER_AGENT").unwrap_or(defaults.source.user_agent);

        let debounce_ms = std::env::var("RERELEASE_DEBOUNCE_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.pipeline.debounce_ms);

        let level = std::env::var("RERELEASE_LOG_LEVEL").unwrap_or(defaults.logging.level);
        let format = std::env::var("RERELEASE_LOG_FORMAT").unwrap_or(defaults.logging.format);

        Ok(Self {
            source: SourceConfig {
                base_url,
                request_timeout_secs,
                max_retries,
                user_agent,
            },
            pipeline: PipelineConfig {
                debounce_ms,
                snapshot_buffer: defaults.pipeline.snapshot_buffer,
            },
            logging: LoggingConfig { level, format },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.source.base_url.trim().is_empty() {
            anyhow::bail!("source.base_url must not be empty");
        }

        if self.source.request_timeout_secs == 0 {
            anyhow::bail!("source.request_timeout_secs must be greater than 0");
        }

        if self.source.max_retries > MAX_RETRIES_LIMIT {
            anyhow::bail!("source.max_retries must be at most {MAX_RETRIES_LIMIT}");
        }

        if self.pipeline.snapshot_buffer == 0 {
            anyhow::bail!("pipeline.snapshot_buffer must be greater than 0");
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            anyhow::bail!("logging.format must be 'text' or 'json'");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_snapshot_buffer() {
        let mut config = Config::default();
        config.pipeline.snapshot_buffer = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = String::from("xml");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debounce_conversion() {
        let config = Config::default();
        assert_eq!(config.pipeline.debounce(), Duration::from_millis(100));
        assert_eq!(config.source.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_max_retries_is_bounded() {
        let mut config = Config::default();
        config.source.max_retries = MAX_RETRIES_LIMIT;
        assert!(config.validate().is_ok());

        config.source.max_retries = 60;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_retries"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[pipeline]\ndebounce_ms = 250\n").unwrap();
        assert_eq!(config.pipeline.debounce_ms, 250);
        assert_eq!(config.pipeline.snapshot_buffer, 32);
        assert_eq!(config.source.base_url, "http://localhost:3030/api");
    }
}
