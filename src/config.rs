//! Run configuration: subscription path, output path, recency window.
//!
//! The config file is optional — a missing or empty file yields
//! `Config::default()`. CLI flags override file values. The config is built
//! once at startup and read-only for the rest of the run.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be
/// specified; missing keys fall back to the defaults below.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the OPML subscription list.
    pub opml_path: PathBuf,

    /// Path of the JSON digest to write.
    pub output_path: PathBuf,

    /// Recency window in days; entries older than this are excluded.
    pub days_back: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            opml_path: PathBuf::from("sec_feeds.xml"),
            output_path: PathBuf::from("data/news_recent.json"),
            days_back: 30,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        // Detect likely typos before deserializing with permissive defaults.
        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = ["opml_path", "output_path", "days_back"];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            opml = %config.opml_path.display(),
            days_back = config.days_back,
            "Loaded configuration"
        );
        Ok(config)
    }
}
