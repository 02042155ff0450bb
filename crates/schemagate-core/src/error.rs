//! Unified error types for all layers of the application.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

/// Unified error type for SchemaGate.
///
/// Request-level problems (bad input, bad connection hash) map to 400,
/// infrastructure failures map to 5xx.
#[derive(Error, Debug)]
pub enum SchemaGateError {
    // ============ Request Errors ============
    /// Validation error, e.g. a required field is missing.
    #[error("{0}")]
    Validation(String),

    /// The connection hash could not be decoded or its signature is wrong.
    #[error("Invalid connection hash: {0}")]
    InvalidHash(String),

    /// The request body exceeds the configured size limit.
    #[error("{0}")]
    PayloadTooLarge(String),

    /// The requested database type has no connector.
    #[error("Unsupported database type: {0}")]
    UnsupportedDatabase(String),

    // ============ Infrastructure Errors ============
    /// Failed to open a database connection.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Database error while running a statement.
    #[error("Database error: {0}")]
    Database(String),

    /// Redis/Cache error
    #[error("Cache error: {0}")]
    Cache(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Timeout error
    #[error("Operation timed out: {0}")]
    Timeout(String),

    // ============ Internal Errors ============
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SchemaGateError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::InvalidHash(_) | Self::UnsupportedDatabase(_) => 400,
            Self::PayloadTooLarge(_) => 413,
            Self::Timeout(_) => 503,
            Self::Connection(_)
            | Self::Database(_)
            | Self::Cache(_)
            | Self::Configuration(_)
            | Self::Internal(_)
            | Self::Other(_) => 500,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidHash(_) => "INVALID_HASH",
            Self::UnsupportedDatabase(_) => "UNSUPPORTED_DATABASE",
            Self::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            Self::Connection(_) => "CONNECTION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    /// Creates the validation error reported for a missing request field.
    #[must_use]
    pub fn required(field: &str) -> Self {
        Self::Validation(format!("{field} is required"))
    }

    /// Creates a database error.
    #[must_use]
    pub fn database<T: Into<String>>(message: T) -> Self {
        Self::Database(message.into())
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection<T: Into<String>>(message: T) -> Self {
        Self::Connection(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }

    /// Checks if this error is retriable.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Database(_) | Self::Cache(_) | Self::Timeout(_)
        )
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for SchemaGateError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Configuration(_)
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => Self::Connection(err.to_string()),
            _ => Self::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for SchemaGateError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON serialization error: {}", err))
    }
}

/// Serializable error body for API responses.
///
/// The `error` key carries the human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
    /// Machine-readable error code
    pub code: String,
}

impl ErrorResponse {
    /// Creates a new error response from a `SchemaGateError`.
    #[must_use]
    pub fn from_error(error: &SchemaGateError) -> Self {
        Self {
            error: error.to_string(),
            code: error.error_code().to_string(),
        }
    }

    /// Creates an error response with an explicit message and code.
    #[must_use]
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

impl From<&SchemaGateError> for ErrorResponse {
    fn from(error: &SchemaGateError) -> Self {
        Self::from_error(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(SchemaGateError::validation("bad").status_code(), 400);
        assert_eq!(SchemaGateError::InvalidHash("sig".to_string()).status_code(), 400);
        assert_eq!(SchemaGateError::UnsupportedDatabase("mysql".to_string()).status_code(), 400);
        assert_eq!(SchemaGateError::connection("refused").status_code(), 500);
        assert_eq!(SchemaGateError::database("syntax").status_code(), 500);
        assert_eq!(SchemaGateError::Cache("down".to_string()).status_code(), 500);
        assert_eq!(SchemaGateError::Timeout("slow".to_string()).status_code(), 503);
        assert_eq!(SchemaGateError::PayloadTooLarge("big".to_string()).status_code(), 413);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(SchemaGateError::validation("x").error_code(), "VALIDATION_ERROR");
        assert_eq!(SchemaGateError::InvalidHash("x".to_string()).error_code(), "INVALID_HASH");
        assert_eq!(SchemaGateError::connection("x").error_code(), "CONNECTION_ERROR");
        assert_eq!(SchemaGateError::internal("x").error_code(), "INTERNAL_ERROR");
        assert_eq!(
            SchemaGateError::PayloadTooLarge("x".to_string()).error_code(),
            "PAYLOAD_TOO_LARGE"
        );
    }

    #[test]
    fn test_required_message() {
        let err = SchemaGateError::required("connection_hash");
        assert_eq!(err.to_string(), "connection_hash is required");
    }

    #[test]
    fn test_unsupported_database_message() {
        let err = SchemaGateError::UnsupportedDatabase("oracle".to_string());
        assert_eq!(err.to_string(), "Unsupported database type: oracle");
    }

    #[test]
    fn test_retriable_errors() {
        assert!(SchemaGateError::connection("lost").is_retriable());
        assert!(SchemaGateError::Timeout("t".to_string()).is_retriable());
        assert!(!SchemaGateError::validation("bad").is_retriable());
        assert!(!SchemaGateError::InvalidHash("bad".to_string()).is_retriable());
    }

    #[test]
    fn test_error_response_from_error() {
        let err = SchemaGateError::required("query");
        let response = ErrorResponse::from_error(&err);
        assert_eq!(response.error, "query is required");
        assert_eq!(response.code, "VALIDATION_ERROR");
    }

    #[test]
    fn test_error_response_serializes_error_key() {
        let response = ErrorResponse::new("Invalid connection hash", "INVALID_HASH");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["error"], "Invalid connection hash");
        assert_eq!(json["code"], "INVALID_HASH");
    }
}
