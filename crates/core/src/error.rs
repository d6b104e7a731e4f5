//! Error types for deck-core
//!
//! Provides a unified error type whose [`ErrorKind`] is translated into a
//! transport status code at the HTTP boundary.

use thiserror::Error;

/// Result type alias for deck-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for deck-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed request input
    #[error("{0}")]
    Validation(String),

    /// Unknown bucket id or missing object
    #[error("Not found: {0}")]
    NotFound(String),

    /// The object-storage provider rejected or failed a call
    #[error("{0}")]
    Upstream(String),

    /// Some items of a batch failed after others already succeeded
    #[error("{context}: {succeeded} succeeded, {failed} failed")]
    PartialBatch {
        context: String,
        succeeded: usize,
        failed: usize,
    },

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local path could not be used
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Coarse error classification used by the HTTP layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Upstream,
    PartialBatch,
    Internal,
}

impl Error {
    /// Classify this error
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) | Error::InvalidPath(_) | Error::InvalidUrl(_) => {
                ErrorKind::Validation
            }
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Upstream(_) => ErrorKind::Upstream,
            Error::PartialBatch { .. } => ErrorKind::PartialBatch,
            Error::Config(_) | Error::Io(_) | Error::Json(_) => ErrorKind::Internal,
        }
    }

    /// Shortcut for a missing required field
    pub fn missing(field: &str) -> Self {
        Error::Validation(format!("missing {field}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::missing("bucket ID").kind(), ErrorKind::Validation);
        assert_eq!(Error::InvalidPath("x".into()).kind(), ErrorKind::Validation);
        assert_eq!(Error::NotFound("x".into()).kind(), ErrorKind::NotFound);
        assert_eq!(Error::Upstream("x".into()).kind(), ErrorKind::Upstream);
        assert_eq!(Error::Config("x".into()).kind(), ErrorKind::Internal);
        assert_eq!(
            Error::PartialBatch {
                context: "delete".into(),
                succeeded: 1,
                failed: 2
            }
            .kind(),
            ErrorKind::PartialBatch
        );
    }

    #[test]
    fn test_error_display() {
        let err = Error::missing("object key");
        assert_eq!(err.to_string(), "missing object key");

        let err = Error::NotFound("bucket configuration".into());
        assert_eq!(err.to_string(), "Not found: bucket configuration");

        let err = Error::PartialBatch {
            context: "Failed to delete folder photos/".into(),
            succeeded: 3,
            failed: 1,
        };
        assert_eq!(
            err.to_string(),
            "Failed to delete folder photos/: 3 succeeded, 1 failed"
        );
    }
}
