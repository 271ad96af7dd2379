//! Process-level errors for the collector and producer binaries

use std::path::PathBuf;

use crate::event_log::LogError;

/// Result type for collector setup and producer runs
pub type CollectorResult<T> = Result<T, CollectorError>;

#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid value '{value}' for {name}")]
    InvalidEnv { name: String, value: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Log(#[from] LogError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}
