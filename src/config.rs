//! Configuration file parser for ~/.config/feedstash/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are accepted but logged, since they are usually typos.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::storage::DEFAULT_RETENTION_DAYS;

/// Bounds for `retention_days`, shared with the `prune --days` argument.
pub const MIN_RETENTION_DAYS: i64 = 1;
pub const MAX_RETENTION_DAYS: i64 = 36_500;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level configuration. Any subset of keys may be given.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Article database location. Defaults to `~/.config/feedstash/articles.db`;
    /// the `--db` flag overrides both.
    pub database_path: Option<PathBuf>,

    /// Days an article is kept after ingest before `prune` removes it.
    pub retention_days: i64,

    /// How many articles `list --newest` shows when no count is given.
    pub newest_limit: i64,

    /// Column width used to clamp card text.
    pub card_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            retention_days: DEFAULT_RETENTION_DAYS,
            newest_limit: 10,
            card_width: 60,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 4] =
        ["database_path", "retention_days", "newest_limit", "card_width"];

    /// Load configuration from a TOML file.
    ///
    /// - Missing or empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)`
    /// - `retention_days` is clamped to 1..=36500 and `card_width` is raised to at least 10
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let mut config: Config = toml::from_str(&content)?;
        let clamped = config
            .retention_days
            .clamp(MIN_RETENTION_DAYS, MAX_RETENTION_DAYS);
        if clamped != config.retention_days {
            tracing::warn!(
                retention_days = config.retention_days,
                clamped,
                "retention_days out of range, clamping"
            );
            config.retention_days = clamped;
        }
        config.card_width = config.card_width.max(10);

        tracing::info!(
            path = %path.display(),
            retention_days = config.retention_days,
            "Loaded configuration"
        );
        Ok(config)
    }
}

// ============================================================================
// Tests
// ============================================================================
