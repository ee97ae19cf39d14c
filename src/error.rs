use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("Invalid device address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status code: {0}")]
    UnexpectedStatus(u16),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExporterError {
    /// Short stable tag for log fields, so operators can tell failure causes apart.
    pub fn kind(&self) -> &'static str {
        match self {
            ExporterError::InvalidAddress { .. } => "invalid_address",
            ExporterError::Http(_) => "transport",
            ExporterError::UnexpectedStatus(_) => "http_status",
            ExporterError::Timeout(_) => "timeout",
            ExporterError::Json(_) => "decode",
            ExporterError::Config(_) => "config",
            ExporterError::Io(_) => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, ExporterError>;
