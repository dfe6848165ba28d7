//! Error types for SiteBrief.
//!
//! Library crates use [`SiteBriefError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all SiteBrief operations.
#[derive(Debug, thiserror::Error)]
pub enum SiteBriefError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// A secret required by the selected providers is not configured.
    #[error("{0} API key not found")]
    MissingCredential(String),

    /// Transport failure talking to a provider.
    #[error("network error: {0}")]
    Network(String),

    /// Provider answered with an error status or a failure flag.
    #[error("{0}")]
    Provider(String),

    /// Provider succeeded but returned no usable text.
    #[error("{0}")]
    EmptyContent(String),

    /// Language-model response did not have the expected shape.
    #[error("analysis error: {0}")]
    Analysis(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Input validation error (bad URL, empty key, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// HTML-to-Markdown conversion error.
    #[error("conversion error: {0}")]
    Conversion(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SiteBriefError>;

impl SiteBriefError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Error for a non-2xx provider response, preferring the provider's own
    /// message over the bare status line.
    pub fn http_status(code: u16, reason: Option<&str>, provider_message: Option<String>) -> Self {
        Self::Provider(provider_message.unwrap_or_else(|| {
            format!("HTTP {code}: {}", reason.unwrap_or("Unknown Status"))
        }))
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
