use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::ParseError;

#[derive(Debug, Error)]
pub enum DctxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] ParseError),

    #[error("Figma API error (status: {status:?}): {message}")]
    FigmaApi {
        status: Option<StatusCode>,
        message: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Design is not traversable: {0}")]
    Untraversable(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DctxError {
    pub fn figma_api(status: Option<StatusCode>, message: impl Into<String>) -> Self {
        DctxError::FigmaApi {
            status,
            message: message.into(),
        }
    }

    pub fn untraversable(message: impl Into<String>) -> Self {
        DctxError::Untraversable(message.into())
    }

    pub fn to_payload(&self) -> ErrorPayload {
        match self {
            DctxError::Io(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check file paths/permissions.",
            ),
            DctxError::Network(e) => ErrorPayload::new(
                ErrorCategory::Network,
                e.to_string(),
                "Check connectivity/proxy/VPN and retry.",
            ),
            DctxError::InvalidUrl(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Verify the API base URL (e.g., https://api.figma.com).",
            ),
            DctxError::FigmaApi { status, message } => {
                let remediation = match status.map(|s| s.as_u16()) {
                    Some(403) => "Check that FIGMA_TOKEN has access to this file.",
                    Some(404) => "Verify the file key and node ids exist.",
                    Some(429) => "Rate limited by Figma; retry after waiting.",
                    _ => "Check FIGMA_TOKEN/file key and rate limits; retry after waiting.",
                };
                ErrorPayload::new(
                    ErrorCategory::Figma,
                    format!("Figma API error (status {:?}): {}", status, message),
                    remediation,
                )
            }
            DctxError::Serialization(e) => ErrorPayload::new(
                ErrorCategory::Input,
                e.to_string(),
                "Check that the input is a raw Figma files or nodes response.",
            ),
            DctxError::Yaml(e) => ErrorPayload::new(
                ErrorCategory::Input,
                e.to_string(),
                "Retry with --format json; run with --verbose for details.",
            ),
            DctxError::Untraversable(msg) => ErrorPayload::new(
                ErrorCategory::Input,
                msg.to_string(),
                "Make sure the response contains a document and every requested node id.",
            ),
            DctxError::Config(msg) => {
                let lower = msg.to_ascii_lowercase();
                if lower.contains("figma_token") || lower.contains("figma token") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Set FIGMA_TOKEN (or FIGMA_OAUTH_TOKEN) before fetching from Figma.",
                    )
                } else if lower.contains("file key") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Pass --file-key or a Figma URL: https://www.figma.com/design/<FILE_KEY>/... with node-id if needed.",
                    )
                } else if lower.contains("timeout") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Use a positive request timeout in the config file (e.g., request = \"30s\").",
                    )
                } else {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Check flags/paths (e.g., --depth N) and required tokens.",
                    )
                }
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, DctxError>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Config,
    Network,
    Figma,
    Input,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub category: ErrorCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl ErrorPayload {
    pub fn new(category: ErrorCategory, message: String, remediation: impl Into<String>) -> Self {
        Self {
            category,
            message,
            remediation: Some(remediation.into()),
        }
    }
}
