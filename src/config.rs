//! Logger configuration.
//!
//! A [`LoggerConfig`] is a plain value: it can be built in code, loaded from a
//! TOML file or read from the environment, and then handed to
//! [`Logger::from_config`](crate::Logger::from_config) or applied to a running
//! logger with [`Logger::apply_config`](crate::Logger::apply_config).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::clock::is_valid_layout;
use crate::error::ConfigError;
use crate::severity::Severity;

/// Index documents are written to unless configured otherwise.
pub const DEFAULT_INDEX: &str = "logs";
/// Records below this severity are not forwarded to the remote sink by default.
pub const DEFAULT_LEVEL: Severity = Severity::Error;
/// `YYYY-MM-DD hh:mm:ss`
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const ENV_INDEX: &str = "ELASTIC_LOGGER_INDEX";
pub const ENV_LEVEL: &str = "ELASTIC_LOGGER_LEVEL";
pub const ENV_TIME_FORMAT: &str = "ELASTIC_LOGGER_TIME_FORMAT";

/// Settings governing record construction and remote forwarding.
///
/// Missing TOML keys take their defaults:
///
/// ```toml
/// index = "service-logs"
/// level = "warning"
/// time_format = "%Y-%m-%dT%H:%M:%S%.3f%:z"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggerConfig {
    /// Name of the remote index records are written to
    pub index: String,
    /// Minimum severity forwarded to the remote sink
    pub level: Severity,
    /// strftime layout for the `timestamp` field
    pub time_format: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            index: DEFAULT_INDEX.to_string(),
            level: DEFAULT_LEVEL,
            time_format: DEFAULT_TIME_FORMAT.to_string(),
        }
    }
}

impl LoggerConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Builds a config from `ELASTIC_LOGGER_*` environment variables.
    ///
    /// Unset variables keep their default values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(index) = lookup(ENV_INDEX) {
            config.index = index;
        }
        if let Some(level) = lookup(ENV_LEVEL) {
            config.level = level
                .parse()
                .map_err(|source| ConfigError::Env { var: ENV_LEVEL, source })?;
        }
        if let Some(layout) = lookup(ENV_TIME_FORMAT) {
            config.time_format = layout;
        }
        config.validate()?;
        Ok(config)
    }

    /// Rejects an empty index name or a layout chrono cannot render.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.index.trim().is_empty() {
            return Err(ConfigError::EmptyIndex);
        }
        if !is_valid_layout(&self.time_format) {
            return Err(ConfigError::InvalidTimeFormat(self.time_format.clone()));
        }
        Ok(())
    }
}
