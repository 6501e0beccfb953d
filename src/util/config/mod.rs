//! hostrt configuration
//!
//! # Configuration hierarchy
//!
//! ```text
//! Priority (high → low):
//! 1. CLI arguments (--config FILE)
//! 2. Environment variables (HOSTRT_CONFIG, HOSTRT_LOG)
//! 3. Working directory (./hostrt.toml)
//! 4. Default values
//! ```
//!
//! # Example
//!
//! ```toml
//! [gc]
//! region_size = 65536
//! max_heap_size = 268435456
//! retained_regions = 4
//!
//! [log]
//! level = "debug"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::runtime::gc::GCConfig;
use crate::util::logger::LogLevel;

/// Config file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "hostrt.toml";

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "HOSTRT_CONFIG";

/// Environment variable overriding the log level
pub const LOG_ENV: &str = "HOSTRT_LOG";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RuntimeConfig {
    /// Heap and collector settings
    #[serde(default)]
    pub gc: GCConfig,
    /// Logging settings
    #[serde(default)]
    pub log: LogConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// One of `debug`, `info`, `warn`, `error`
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl RuntimeConfig {
    /// Parsed log level
    pub fn log_level(&self) -> Result<LogLevel, ConfigError> {
        LogLevel::parse(&self.log.level)
            .ok_or_else(|| ConfigError::InvalidLogLevel(self.log.level.clone()))
    }

    /// Apply `HOSTRT_LOG` if set
    pub fn apply_env(&mut self) {
        if let Ok(level) = std::env::var(LOG_ENV) {
            self.log.level = level;
        }
    }
}

/// Parse configuration from TOML text
pub fn parse_config(content: &str) -> Result<RuntimeConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Load configuration from `path`. A missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<RuntimeConfig, ConfigError> {
    if !path.exists() {
        return Ok(RuntimeConfig::default());
    }
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Resolve which config file applies
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

/// Load configuration following the hierarchy above.
///
/// An explicitly requested file must exist.
pub fn load_config(explicit: Option<&Path>) -> Result<RuntimeConfig, ConfigError> {
    let path = config_path(explicit);
    let mut config = match explicit {
        Some(_) => parse_config(&fs::read_to_string(&path)?)?,
        None => load_config_from(&path)?,
    };
    config.apply_env();
    Ok(config)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),
}

#[cfg(test)]
mod tests;
