/*!
 * Configuration types for the sieve pipeline
 */

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Log verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Configuration for a sieve run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SieveConfig {
    /// Upper bound (inclusive) of the candidate range; the pipeline sieves
    /// [2, max_candidate]
    #[serde(default = "default_max_candidate")]
    pub max_candidate: u64,

    /// Capacity of each stage-to-stage channel. 0 gives rendezvous hops: a
    /// send completes only when the downstream stage takes the value.
    #[serde(default)]
    pub channel_capacity: usize,

    /// Maximum number of stages the chain may grow to (0 = unlimited). Each
    /// stage costs one OS thread, so unbounded input needs a ceiling.
    #[serde(default = "default_max_stages")]
    pub max_stages: usize,

    /// Log level for diagnostic output
    #[serde(default)]
    pub log_level: LogLevel,

    /// Log file path; logs go to stderr as human-readable lines when unset,
    /// to this file as JSON when set
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Verbose logging (same effect as log_level = "debug")
    #[serde(default)]
    pub verbose: bool,
}

// Default value functions for serde
fn default_max_candidate() -> u64 {
    35
}

fn default_max_stages() -> usize {
    1024
}

impl Default for SieveConfig {
    fn default() -> Self {
        Self {
            max_candidate: default_max_candidate(),
            channel_capacity: 0,
            max_stages: default_max_stages(),
            log_level: LogLevel::default(),
            log_file: None,
            verbose: false,
        }
    }
}

impl SieveConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
                path: path.display().to_string(),
                source,
            })?;
        let config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = SieveConfig::default();
        assert_eq!(config.max_candidate, 35);
        assert_eq!(config.channel_capacity, 0);
        assert_eq!(config.max_stages, 1024);
        assert_eq!(config.log_level, LogLevel::Info);
        assert!(config.log_file.is_none());
        assert!(!config.verbose);
    }

    #[test]
    fn test_log_level_serde_lowercase() {
        let level: LogLevel = toml::from_str::<SieveConfig>("log_level = \"debug\"")
            .unwrap()
            .log_level;
        assert_eq!(level, LogLevel::Debug);

        let serialized = toml::to_string(&SieveConfig::default()).unwrap();
        assert!(serialized.contains("log_level = \"info\""));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "max_candidate = 100").unwrap();
        writeln!(file, "channel_capacity = 8").unwrap();
        writeln!(file, "max_stages = 64").unwrap();
        writeln!(file, "log_level = \"warn\"").unwrap();

        let config = SieveConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_candidate, 100);
        assert_eq!(config.channel_capacity, 8);
        assert_eq!(config.max_stages, 64);
        assert_eq!(config.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_from_file_fills_missing_fields_with_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "max_candidate = 500").unwrap();

        let config = SieveConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_candidate, 500);
        assert_eq!(config.channel_capacity, 0);
        assert_eq!(config.max_stages, 1024);
    }

    #[test]
    fn test_from_file_missing() {
        let err = SieveConfig::from_file(Path::new("/nonexistent/primeline.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileRead { .. }));
        assert!(err.to_string().contains("/nonexistent/primeline.toml"));
    }

    #[test]
    fn test_from_file_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "max_candidate = \"not a number\"").unwrap();

        let err = SieveConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_config_error_converts_to_fatal() {
        let err = SieveConfig::from_file(Path::new("/nonexistent/primeline.toml")).unwrap_err();
        let top: crate::error::PrimelineError = err.into();
        assert!(matches!(top, crate::error::PrimelineError::Config(_)));
        assert!(top.is_fatal());
    }
}
