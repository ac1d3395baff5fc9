//! Error types for Prospector.
//!
//! Library crates use [`ProspectorError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all Prospector operations.
#[derive(Debug, thiserror::Error)]
pub enum ProspectorError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error from a provider call.
    #[error("network error: {0}")]
    Network(String),

    /// Extraction call failure (transport, API, or empty response).
    #[error("extraction error: {0}")]
    Extraction(String),

    /// JSON payload could not be located or parsed.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Data validation error (missing required input, bad config value).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// CSV row reading or writing error.
    #[error("csv error: {0}")]
    Csv(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ProspectorError>;

impl ProspectorError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<csv::Error> for ProspectorError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e.to_string())
    }
}
