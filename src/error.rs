//! Error types for gallica-mcp.

use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

/// Errors that can occur while searching or driving a report session.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or missing input field
    #[error("{0}")]
    Validation(String),

    /// Operation requires state that has not been set up yet
    #[error("{0}")]
    PreconditionFailed(String),

    /// The search service reported a failure
    #[error("Search error: {0}")]
    Search(String),

    /// HTTP status or transport failure talking to the SRU endpoint
    #[error("HTTP error: {0}")]
    Http(String),

    /// The SRU response could not be understood
    #[error("Parse error: {0}")]
    Parse(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No tool registered under this name
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// A tool input schema failed to compile
    #[error("Schema error: {0}")]
    Schema(String),

    /// Anything else that went wrong while processing a step
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Stable classification of an [`Error`], reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    ValidationError,
    PreconditionFailed,
    DiscoveryFailure,
    InternalError,
}

impl Error {
    /// Shorthand for a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) | Error::UnknownTool(_) => ErrorKind::ValidationError,
            Error::PreconditionFailed(_) => ErrorKind::PreconditionFailed,
            Error::Search(_) | Error::Http(_) | Error::Parse(_) => ErrorKind::DiscoveryFailure,
            Error::Json(_) | Error::Schema(_) | Error::Internal(_) => ErrorKind::InternalError,
        }
    }

    /// Render as the structured error result returned to tool callers.
    pub fn to_payload(&self) -> Value {
        json!({
            "error": self.to_string(),
            "kind": self.kind(),
            "status": "failed",
        })
    }
}

/// Result type for gallica-mcp operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(Error::validation("x").kind(), ErrorKind::ValidationError);
        assert_eq!(
            Error::PreconditionFailed("x".into()).kind(),
            ErrorKind::PreconditionFailed
        );
        assert_eq!(Error::Http("503".into()).kind(), ErrorKind::DiscoveryFailure);
        assert_eq!(Error::Internal("x".into()).kind(), ErrorKind::InternalError);
    }

    #[test]
    fn test_payload_shape() {
        let payload = Error::validation("sectionNumber is required").to_payload();
        assert_eq!(payload["error"], "sectionNumber is required");
        assert_eq!(payload["kind"], "ValidationError");
        assert_eq!(payload["status"], "failed");
    }
}
