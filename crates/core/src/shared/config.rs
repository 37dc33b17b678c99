use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::expression::domain::detection::DetectorOptions;
use crate::shared::constants::{APP_DIR_NAME, MODEL_SOURCE_ENV};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Persisted application settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL (`http(s)://`) or local directory holding both models.
    /// Empty uses cached or bundled models and the public downloads.
    pub model_source: String,
    pub detector: DetectorOptions,
    /// Platform camera device; `None` picks the default camera.
    pub camera_device: Option<String>,
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("config.json"))
    }

    /// Load from the user config file, falling back to defaults when it is
    /// missing or unreadable, then apply the environment override.
    pub fn load() -> Self {
        let config = match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path).unwrap_or_else(|e| {
                log::warn!("Ignoring config: {e}");
                Self::default()
            }),
            _ => Self::default(),
        };
        config
            .with_valid_detector()
            .with_env_override(std::env::var(MODEL_SOURCE_ENV).ok())
    }

    /// Replaces detector options the models cannot run with by defaults.
    pub fn with_valid_detector(mut self) -> Self {
        if let Err(e) = self.detector.validate() {
            log::warn!("Ignoring detector settings: {e}");
            self.detector = DetectorOptions::default();
        }
        self
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| ConfigError::Write {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// A non-empty `source` replaces `model_source`.
    pub fn with_env_override(mut self, source: Option<String>) -> Self {
        if let Some(source) = source.filter(|s| !s.trim().is_empty()) {
            self.model_source = source;
        }
        self
    }
}
