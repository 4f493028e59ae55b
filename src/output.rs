use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::assets::AssetDownload;
use crate::error::{ErrorPayload, Result};

/// Schema version for output payloads.
pub const DCTX_OUTPUT_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl OutputFormat {
    /// Render `value` as pretty JSON or YAML.
    pub fn render<T: Serialize + ?Sized>(self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOutput {
    pub version: String,
    pub error: ErrorPayload,
}

impl ErrorOutput {
    pub fn new(error: ErrorPayload) -> Self {
        Self {
            version: DCTX_OUTPUT_VERSION.to_string(),
            error,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagesOutput {
    pub version: String,
    pub file_key: String,
    pub dir: PathBuf,
    pub downloaded: usize,
    pub failed: usize,
    pub assets: Vec<AssetDownload>,
}

impl ImagesOutput {
    pub fn new(file_key: impl Into<String>, dir: PathBuf, assets: Vec<AssetDownload>) -> Self {
        let downloaded = assets.iter().filter(|a| a.is_downloaded()).count();
        Self {
            version: DCTX_OUTPUT_VERSION.to_string(),
            file_key: file_key.into(),
            dir,
            downloaded,
            failed: assets.len() - downloaded,
            assets,
        }
    }
}
