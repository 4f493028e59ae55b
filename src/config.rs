use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::figma_client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::output::OutputFormat;

pub const DEFAULT_ASSETS_DIR: &str = "./figma-assets";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Parse(#[from] toml::de::Error),

    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Default tree depth when `--depth` is not given.
    pub depth: Option<u32>,
    pub format: OutputFormat,
    pub timeouts: Timeouts,
    pub api: ApiConfig,
    pub assets: AssetsConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Timeouts {
    #[serde(with = "humantime_serde")]
    pub request: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            request: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    pub dir: PathBuf,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_ASSETS_DIR),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            depth: None,
            format: OutputFormat::Json,
            timeouts: Timeouts::default(),
            api: ApiConfig::default(),
            assets: AssetsConfig::default(),
        }
    }
}

impl Config {
    /// Load from `path`, else `~/.config/dctx/config.toml` when present, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        match Self::central_config_path() {
            Some(central) if central.is_file() => Self::from_file(&central),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn central_config_path() -> Option<PathBuf> {
        std::env::var_os("HOME")
            .filter(|home| !home.is_empty())
            .map(|home| PathBuf::from(home).join(".config/dctx/config.toml"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api.base_url must not be empty".into()));
        }
        if self.timeouts.request.is_zero() {
            return Err(ConfigError::Invalid(
                "timeouts.request must be a positive timeout".into(),
            ));
        }
        Ok(())
    }
}
