//! Coordinator configuration parsing.
//!
//! Configuration is a small TOML document covering the pieces that differ
//! between installs: where the durable slot lives, the default stream
//! request parameters, and the platform notification channel alerts are
//! posted on. Every field has a default, so an empty document is valid.

use std::path::PathBuf;

use beacon_core::request::{
    Precision, RequestValidationError, StreamRequest, DEFAULT_DESIRED_INTERVAL_MS,
    DEFAULT_MIN_INTERVAL_MS,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML failed to parse or carried unknown keys.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configured stream defaults fail validation.
    #[error("invalid stream defaults: {0}")]
    InvalidStream(#[from] RequestValidationError),
}

/// Default stream request parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StreamConfig {
    /// Preferred interval between provider reports, in milliseconds.
    #[serde(default = "default_desired_interval_ms")]
    pub desired_interval_ms: i64,

    /// Floor below which reports are unwanted, in milliseconds.
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: i64,

    /// Requested precision tier.
    #[serde(default = "default_precision")]
    pub precision: Precision,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            desired_interval_ms: default_desired_interval_ms(),
            min_interval_ms: default_min_interval_ms(),
            precision: default_precision(),
        }
    }
}

const fn default_desired_interval_ms() -> i64 {
    DEFAULT_DESIRED_INTERVAL_MS
}

const fn default_min_interval_ms() -> i64 {
    DEFAULT_MIN_INTERVAL_MS
}

const fn default_precision() -> Precision {
    Precision::HighAccuracy
}

fn default_store_dir() -> PathBuf {
    PathBuf::from("beacon-state")
}

fn default_alert_channel() -> String {
    "events".to_owned()
}

/// Top-level coordinator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoordinatorConfig {
    /// Directory holding the durable pending slot.
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,

    /// Default stream request parameters.
    #[serde(default)]
    pub stream: StreamConfig,

    /// Platform notification channel alerts are posted on.
    #[serde(default = "default_alert_channel")]
    pub alert_channel: String,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            stream: StreamConfig::default(),
            alert_channel: default_alert_channel(),
        }
    }
}

impl CoordinatorConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the file cannot be read or parsed, or
    /// when the stream defaults fail validation.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the TOML is invalid, carries unknown
    /// keys, or the stream defaults fail validation.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.default_stream_request().validate()?;
        Ok(config)
    }

    /// Returns the default stream request built from this configuration.
    #[must_use]
    pub const fn default_stream_request(&self) -> StreamRequest {
        StreamRequest::new(
            self.stream.desired_interval_ms,
            self.stream.min_interval_ms,
            self.stream.precision,
        )
    }
}
