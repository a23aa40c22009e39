//! Configuration loading and config file resolution
//!
//! All settings have built-in defaults. A missing or unreadable TOML file
//! never aborts startup: a warning is logged and the defaults are used.
//!
//! # Config file priority
//!
//! 1. Explicit path (command-line `--config`)
//! 2. Environment variable (`AHP_CONFIG`)
//! 3. User config file (`<config_dir>/ahp-engine/config.toml`)
//! 4. Compiled defaults

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "AHP_CONFIG";

/// Conventional CR threshold above which a judgment matrix is inconsistent
pub const DEFAULT_CONSISTENCY_THRESHOLD: f64 = 0.1;

/// Default broadcast capacity of the event bus
pub const DEFAULT_EVENT_CAPACITY: usize = 100;

/// Engine configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// CR above this value is reported as inconsistent (never rejected)
    #[serde(default = "default_consistency_threshold")]
    pub consistency_threshold: f64,

    /// Number of events buffered by the EventBus
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            consistency_threshold: default_consistency_threshold(),
            event_capacity: default_event_capacity(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_consistency_threshold() -> f64 {
    DEFAULT_CONSISTENCY_THRESHOLD
}

fn default_event_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}

fn default_log_level() -> String {
    "info".to_string()
}

impl EngineConfig {
    /// Parse configuration from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if !self.consistency_threshold.is_finite() || self.consistency_threshold <= 0.0 {
            return Err(Error::Config(format!(
                "consistency_threshold must be a positive number, got {}",
                self.consistency_threshold
            )));
        }
        if self.event_capacity == 0 {
            return Err(Error::Config("event_capacity must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Resolve and load configuration following the priority order
    ///
    /// A file that is missing or fails to read falls back to defaults with a
    /// warning. A file that parses but holds invalid values is an error.
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        let Some(path) = resolve_config_path(cli_path) else {
            info!("No config file found, using built-in defaults");
            return Ok(Self::default());
        };

        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let config = Self::from_toml_str(&content)?;
                info!("Loaded configuration from {}", path.display());
                Ok(config)
            }
            Err(e) => {
                warn!(
                    "Could not read config file {}: {} (using defaults)",
                    path.display(),
                    e
                );
                Ok(Self::default())
            }
        }
    }

    /// Serialize configuration as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}

/// Pick the config file path by priority; `None` means use compiled defaults
pub fn resolve_config_path(cli_path: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: User config file, only when present
    default_config_path().filter(|p| p.exists())
}

/// Platform config location: `<config_dir>/ahp-engine/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ahp-engine").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.consistency_threshold, 0.1);
        assert_eq!(config.event_capacity, 100);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = EngineConfig::from_toml_str("consistency_threshold = 0.2\n").unwrap();
        assert_eq!(config.consistency_threshold, 0.2);
        assert_eq!(config.event_capacity, DEFAULT_EVENT_CAPACITY);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_rejects_non_positive_threshold() {
        let err = EngineConfig::from_toml_str("consistency_threshold = 0.0\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let err = EngineConfig::from_toml_str("event_capacity = 0\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_malformed_toml_is_error() {
        let err = EngineConfig::from_toml_str("consistency_threshold = \"high\"\n").unwrap_err();
        assert!(matches!(err, Error::Toml(_)));
    }

    #[test]
    fn test_cli_path_has_priority() {
        let path = PathBuf::from("/tmp/explicit.toml");
        assert_eq!(resolve_config_path(Some(&path)), Some(path));
    }
}
