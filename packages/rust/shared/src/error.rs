//! Error types for SalesIntel.
//!
//! Library crates use [`SalesIntelError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all SalesIntel operations.
#[derive(Debug, thiserror::Error)]
pub enum SalesIntelError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport-level HTTP error talking to a remote service.
    #[error("network error: {0}")]
    Network(String),

    /// The text generator could not produce a reply.
    #[error("generation error: {0}")]
    Generation(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Input validation error (blank company name, bad flag value, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// JSON encode/decode error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SalesIntelError>;

impl SalesIntelError {
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

    /// Create a generation error from any displayable message.
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for SalesIntelError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = SalesIntelError::config("missing API key");
        assert_eq!(err.to_string(), "config error: missing API key");

        let err = SalesIntelError::validation("company name must not be blank");
        assert!(err.to_string().contains("must not be blank"));

        let err = SalesIntelError::generation("quota exhausted");
        assert_eq!(err.to_string(), "generation error: quota exhausted");
    }

    #[test]
    fn io_error_carries_path() {
        let err = SalesIntelError::io(
            "/tmp/memory_bank.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let text = err.to_string();
        assert!(text.contains("memory_bank.json"));
        assert!(text.contains("denied"));
    }

    #[test]
    fn serde_json_errors_convert_to_serialization() {
        fn decode(raw: &str) -> Result<serde_json::Value> {
            Ok(serde_json::from_str(raw)?)
        }

        let err = decode("{ not json").unwrap_err();
        assert!(matches!(err, SalesIntelError::Serialization(_)));
        assert!(err.to_string().starts_with("serialization error:"));
    }
}
