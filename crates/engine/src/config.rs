//! Engine configuration
//!
//! Loaded from JSON like the rest of the stack:
//!
//! ```json
//! {
//!   "retention": { "horizon": { "minutes": 5 } },
//!   "eval_interval_ms": 1000
//! }
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use kestrel_timeseries::RetentionPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Default time between trader evaluations
pub const DEFAULT_EVAL_INTERVAL_MS: u64 = 1_000;

/// Engine-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// History kept by every symbol's partition
    pub retention: RetentionPolicy,
    /// Wall-clock time between evaluations of a running trader (ms)
    pub eval_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retention: RetentionPolicy::default(),
            eval_interval_ms: DEFAULT_EVAL_INTERVAL_MS,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the settings without building anything
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.retention
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if self.eval_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "eval_interval_ms must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Evaluation interval as a duration
    pub fn eval_interval(&self) -> Duration {
        Duration::from_millis(self.eval_interval_ms)
    }

    /// Builder: set the retention policy
    pub fn with_retention(mut self, retention: RetentionPolicy) -> Self {
        self.retention = retention;
        self
    }

    /// Builder: set the evaluation interval
    pub fn with_eval_interval(mut self, interval: Duration) -> Self {
        self.eval_interval_ms = interval.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }
}

/// Configuration loading errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
