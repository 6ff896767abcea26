//! Configuration loading for the parallel reader.
//!
//! All user-tunable settings are centralized here and loaded from
//! `conf/config.toml` if present. Any missing or invalid entries fall back
//! to sensible defaults so a session can still start.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// High-level app configuration; deserializable from TOML.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct AppConfig {
    /// Directory holding persisted sync-point records.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
    /// Run the chapter classifier over EPUB reading orders. When off, every
    /// spine entry is navigable, front matter included.
    #[serde(default = "default_filter_front_matter")]
    pub filter_front_matter: bool,
    /// Use the single adjustable chapter offset instead of sync points when
    /// both sides are EPUBs.
    #[serde(default)]
    pub epub_offset_mode: bool,
    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            cache_dir: default_cache_dir(),
            filter_front_matter: default_filter_front_matter(),
            epub_offset_mode: false,
            log_level: default_log_level(),
        }
    }
}

fn default_cache_dir() -> String {
    ".cache".to_string()
}

fn default_filter_front_matter() -> bool {
    true
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Load configuration from the given path, falling back to defaults when
/// the file is missing or malformed.
pub fn load_config(path: &Path) -> AppConfig {
    match fs::read_to_string(path) {
        Ok(data) => match toml::from_str::<AppConfig>(&data) {
            Ok(config) => {
                debug!(path = %path.display(), "Loaded configuration");
                config
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    "Invalid configuration, using defaults: {err}"
                );
                AppConfig::default()
            }
        },
        Err(_) => {
            debug!(path = %path.display(), "No configuration file, using defaults");
            AppConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_in_defaults() {
        let config: AppConfig = toml::from_str("epub_offset_mode = true").unwrap();
        assert!(config.epub_offset_mode);
        assert!(config.filter_front_matter);
        assert_eq!(config.cache_dir, ".cache");
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn log_level_parses_lowercase_names() {
        let config: AppConfig = toml::from_str("log_level = \"warn\"").unwrap();
        assert_eq!(config.log_level, LogLevel::Warn);
    }
}
