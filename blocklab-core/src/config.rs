//! Builder configuration: TOML file with defaults for every field.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable overriding `api_base_url`.
pub const API_URL_ENV: &str = "BLOCKLAB_API_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Light or dark palette for front ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    /// Pure `light ↔ dark` transition.
    pub fn toggle(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }
}

/// Settings shared by the CLI and the TUI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Base URL of the strategy service (without `/api/strategies`).
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// How long the success notice stays up before the post-save view.
    pub post_save_delay_ms: u64,
    pub default_strategy_name: String,
    pub theme: ThemeMode,
    /// Fallback log filter when `BLOCKLAB_LOG` is unset.
    pub log_level: String,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".to_string(),
            request_timeout_secs: 30,
            post_save_delay_ms: 1500,
            default_strategy_name: "Untitled Strategy".to_string(),
            theme: ThemeMode::Light,
            log_level: "info".to_string(),
        }
    }
}

impl BuilderConfig {
    /// `<config_dir>/blocklab`, falling back to `./.blocklab`.
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("blocklab"))
            .unwrap_or_else(|| PathBuf::from(".blocklab"))
    }

    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn from_toml(content: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`. A missing file yields defaults; a malformed one is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content, &path.display().to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    /// Load from `path` (or the default location) and apply env overrides.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::load(p)?,
            None => Self::load(&Self::default_path())?,
        };
        if let Ok(url) = std::env::var(API_URL_ENV) {
            config.api_base_url = url;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api_base_url must not be empty".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
