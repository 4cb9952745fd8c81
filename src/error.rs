//! Error types for Catapult
//!
//! This module defines all error types used throughout the interview engine.
//! Uses `thiserror` for ergonomic error handling with automatic `Display` and
//! `Error` trait implementations.

use std::fmt;
use thiserror::Error;

// ============================================================================
// Completion Error Classification
// ============================================================================

/// Structured classification of completion-endpoint failures.
///
/// Fine-grained categorization of LLM HTTP errors so callers can make
/// retry decisions without string matching. The engine itself never
/// retries; the classification is surfaced to the caller.
#[derive(Debug)]
pub enum CompletionError {
    /// 401 — Invalid API key or authentication failure
    Auth(String),
    /// 429 — Rate limit or quota exceeded
    RateLimit(String),
    /// 500/502/503/504 — Server-side errors
    ServerError(String),
    /// 400 — Bad request, invalid JSON, malformed parameters
    InvalidRequest(String),
    /// 404 — Model not found or endpoint not available
    ModelNotFound(String),
    /// Connection or read timeout
    Timeout(String),
    /// Catch-all for unrecognized errors
    Unknown(String),
}

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionError::Auth(msg) => write!(f, "Authentication error: {}", msg),
            CompletionError::RateLimit(msg) => write!(f, "Rate limit error: {}", msg),
            CompletionError::ServerError(msg) => write!(f, "Server error: {}", msg),
            CompletionError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            CompletionError::ModelNotFound(msg) => write!(f, "Model not found: {}", msg),
            CompletionError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            CompletionError::Unknown(msg) => write!(f, "Unknown completion error: {}", msg),
        }
    }
}

impl CompletionError {
    /// Returns `true` if this error is transient and the caller may retry.
    ///
    /// Retryable errors: RateLimit, ServerError, Timeout.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CompletionError::RateLimit(_)
                | CompletionError::ServerError(_)
                | CompletionError::Timeout(_)
        )
    }

    /// Returns the HTTP status code associated with this error, if applicable.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            CompletionError::Auth(_) => Some(401),
            CompletionError::RateLimit(_) => Some(429),
            CompletionError::ServerError(_) => Some(500),
            CompletionError::InvalidRequest(_) => Some(400),
            CompletionError::ModelNotFound(_) => Some(404),
            CompletionError::Timeout(_) => None,
            CompletionError::Unknown(_) => None,
        }
    }

    /// Classify an HTTP status into a completion error.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => CompletionError::Auth(body),
            429 => CompletionError::RateLimit(body),
            404 => CompletionError::ModelNotFound(body),
            400 => CompletionError::InvalidRequest(body),
            500..=599 => CompletionError::ServerError(body),
            _ => CompletionError::Unknown(format!("HTTP {}: {}", status, body)),
        }
    }
}

impl From<CompletionError> for CatapultError {
    fn from(err: CompletionError) -> Self {
        CatapultError::Completion(err)
    }
}

// ============================================================================
// Primary Error Type
// ============================================================================

/// The primary error type for Catapult operations.
#[derive(Error, Debug)]
pub enum CatapultError {
    /// Configuration-related errors (unknown model id, invalid thresholds, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// List-store errors (store unreachable, operation failed, corrupt entry)
    #[error("Store error: {0}")]
    Store(String),

    /// Structured completion error with classification for retry decisions.
    #[error("Completion error: {0}")]
    Completion(CompletionError),

    /// Audio transcription failures
    #[error("Transcription error: {0}")]
    Transcription(String),

    /// Standard I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A specialized `Result` type for Catapult operations.
pub type Result<T> = std::result::Result<T, CatapultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CatapultError::Config("missing API key".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing API key");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CatapultError = io_err.into();
        assert!(matches!(err, CatapultError::Io(_)));
    }

    #[test]
    fn test_completion_error_display() {
        assert!(CompletionError::Auth("bad key".into())
            .to_string()
            .contains("Authentication error"));
        assert!(CompletionError::RateLimit("quota".into())
            .to_string()
            .contains("Rate limit error"));
        assert!(CompletionError::ServerError("500".into())
            .to_string()
            .contains("Server error"));
        assert!(CompletionError::InvalidRequest("bad json".into())
            .to_string()
            .contains("Invalid request"));
        assert!(CompletionError::ModelNotFound("gpt-99".into())
            .to_string()
            .contains("Model not found"));
        assert!(CompletionError::Timeout("30s".into())
            .to_string()
            .contains("Timeout"));
        assert!(CompletionError::Unknown("???".into())
            .to_string()
            .contains("Unknown completion error"));
    }

    #[test]
    fn test_completion_error_is_retryable() {
        assert!(CompletionError::RateLimit("429".into()).is_retryable());
        assert!(CompletionError::ServerError("500".into()).is_retryable());
        assert!(CompletionError::Timeout("timeout".into()).is_retryable());

        assert!(!CompletionError::Auth("401".into()).is_retryable());
        assert!(!CompletionError::InvalidRequest("400".into()).is_retryable());
        assert!(!CompletionError::ModelNotFound("404".into()).is_retryable());
        assert!(!CompletionError::Unknown("???".into()).is_retryable());
    }

    #[test]
    fn test_completion_error_status_code() {
        assert_eq!(CompletionError::Auth("x".into()).status_code(), Some(401));
        assert_eq!(
            CompletionError::RateLimit("x".into()).status_code(),
            Some(429)
        );
        assert_eq!(
            CompletionError::ServerError("x".into()).status_code(),
            Some(500)
        );
        assert_eq!(
            CompletionError::InvalidRequest("x".into()).status_code(),
            Some(400)
        );
        assert_eq!(
            CompletionError::ModelNotFound("x".into()).status_code(),
            Some(404)
        );
        assert_eq!(CompletionError::Timeout("x".into()).status_code(), None);
        assert_eq!(CompletionError::Unknown("x".into()).status_code(), None);
    }

    #[test]
    fn test_from_status_classification() {
        assert!(matches!(
            CompletionError::from_status(401, "no".into()),
            CompletionError::Auth(_)
        ));
        assert!(matches!(
            CompletionError::from_status(429, "slow down".into()),
            CompletionError::RateLimit(_)
        ));
        assert!(matches!(
            CompletionError::from_status(404, "gone".into()),
            CompletionError::ModelNotFound(_)
        ));
        assert!(matches!(
            CompletionError::from_status(400, "bad".into()),
            CompletionError::InvalidRequest(_)
        ));
        assert!(matches!(
            CompletionError::from_status(503, "busy".into()),
            CompletionError::ServerError(_)
        ));
        assert!(matches!(
            CompletionError::from_status(302, "redirect".into()),
            CompletionError::Unknown(_)
        ));
    }

    #[test]
    fn test_completion_error_into_catapult_error() {
        let ce = CompletionError::RateLimit("too fast".into());
        let err: CatapultError = ce.into();
        assert!(matches!(err, CatapultError::Completion(_)));
        assert!(err.to_string().contains("Rate limit error"));
    }
}
