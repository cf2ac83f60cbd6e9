//! Sender configuration.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $BATCHQ_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/batchq/config.toml
//!   3. ~/.config/batchq/config.toml
//!
//! The file holds one `[sender]` table:
//!
//! ```toml
//! [sender]
//! queue_url = "https://queue.example/123/jobs"
//! flush_amount = 10
//! overwrite_by_id = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::wire::MAX_BATCH_ENTRIES;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct ConfigFile {
    sender: SenderConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderConfig {
    /// Address of the target queue.
    pub queue_url: String,
    /// Entries buffered before a batch call. Clamped to [1, 10] on use.
    pub flush_amount: usize,
    /// Replace a still-buffered entry when a new one shares its `Id`.
    pub overwrite_by_id: bool,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            queue_url: String::new(),
            flush_amount: MAX_BATCH_ENTRIES,
            overwrite_by_id: false,
        }
    }
}

/// Clamp a requested flush size to the protocol bound.
pub fn clamp_flush_amount(requested: usize) -> usize {
    requested.clamp(1, MAX_BATCH_ENTRIES)
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl SenderConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_file(&Self::file_path())?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Read `path` if it exists, otherwise return defaults. No env overrides.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFailed(path.to_path_buf(), e))?;
        Self::from_toml_str(&text).map_err(|e| ConfigError::ParseFailed(path.to_path_buf(), e))
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let file: ConfigFile = toml::from_str(text)?;
        Ok(file.sender)
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("BATCHQ_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Flush size actually used by a sender built from this config.
    pub fn effective_flush_amount(&self) -> usize {
        clamp_flush_amount(self.flush_amount)
    }

    /// Apply BATCHQ_SENDER__* env var overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("BATCHQ_SENDER__QUEUE_URL") {
            self.queue_url = v;
        }
        if let Some(v) = lookup("BATCHQ_SENDER__FLUSH_AMOUNT") {
            match v.parse() {
                Ok(n) => self.flush_amount = n,
                Err(_) => {
                    tracing::warn!(value = %v, "ignoring invalid BATCHQ_SENDER__FLUSH_AMOUNT")
                }
            }
        }
        if let Some(v) = lookup("BATCHQ_SENDER__OVERWRITE_BY_ID") {
            self.overwrite_by_id = v == "true" || v == "1";
        }
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
        .join("batchq")
}

fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}
