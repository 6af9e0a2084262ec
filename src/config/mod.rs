//! Configuration management for worker-runtime
//!
//! Runtime settings are read from an optional TOML file and overlaid by
//! environment variables.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::utils::env::{env_bool_opt, env_opt};

/// Environment variable enabling the cycle diagnostic
pub const ENV_DEBUG: &str = "WORKER_RUNTIME_DEBUG";

/// Environment variable holding the log filter
pub const ENV_LOG: &str = "WORKER_RUNTIME_LOG";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Worker runtime configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Report cyclic module groups before force-building them
    #[serde(default)]
    pub debug: bool,

    /// Log filter (e.g. "info", "worker_runtime::module=debug")
    #[serde(default)]
    pub log_filter: Option<String>,

    /// JSON log output (requires the `json-logging` feature)
    #[serde(default)]
    pub json_logs: bool,
}

impl RuntimeConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `WORKER_RUNTIME_DEBUG` and `WORKER_RUNTIME_LOG` if set
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(debug) = env_bool_opt(ENV_DEBUG) {
            self.debug = debug;
        }
        if let Some(filter) = env_opt(ENV_LOG) {
            self.log_filter = Some(filter);
        }
        self
    }

    /// File (if any) plus environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_env_overrides())
    }
}
