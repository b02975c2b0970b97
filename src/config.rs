//! Application configuration persistence
//!
//! Loads `config.json` from the platform config directory, falling back to
//! defaults when the file is missing or malformed.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::transport::SourceStrategy;
use crate::utils;

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the mood service
    pub base_url: String,
    /// How track references are resolved into playable audio
    #[serde(default)]
    pub strategy: SourceStrategy,
    /// Starting volume (0.0 to 1.0)
    #[serde(default = "default_volume")]
    pub volume: f32,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Where the camera companion writes the latest frame
    #[serde(default = "utils::default_frame_path")]
    pub frame_path: PathBuf,
}

fn default_volume() -> f32 {
    0.3
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            strategy: SourceStrategy::default(),
            volume: default_volume(),
            request_timeout_secs: default_timeout_secs(),
            frame_path: utils::default_frame_path(),
        }
    }
}

impl Config {
    fn file_path() -> Option<PathBuf> {
        utils::config_dir().map(|dir| dir.join("config.json"))
    }

    /// Load from the default location, falling back to defaults
    ///
    /// On first run the defaults are written out so there is a file to edit.
    pub fn load() -> Self {
        match Self::file_path() {
            Some(path) if path.exists() => Self::load_from_file(&path).unwrap_or_else(|err| {
                tracing::warn!("ignoring broken config: {}", err);
                Self::default()
            }),
            _ => {
                let config = Self::default();
                if let Err(err) = config.save() {
                    tracing::debug!("could not write default config: {}", err);
                }
                config
            }
        }
    }

    /// Load from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("could not read config at {:?}", path))?;
        serde_json::from_str(&content).with_context(|| format!("could not parse {:?}", path))
    }

    /// Save to the default location
    pub fn save(&self) -> Result<()> {
        let path = Self::file_path().context("could not determine config directory")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }
}
