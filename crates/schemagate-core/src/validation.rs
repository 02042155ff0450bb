//! Validation utilities.

use crate::SchemaGateError;
use validator::{Validate, ValidationErrors};

/// Extension trait for validation.
pub trait ValidateExt: Validate {
    /// Validates the struct and returns a `SchemaGateError` on failure.
    fn validate_request(&self) -> Result<(), SchemaGateError> {
        self.validate().map_err(validation_errors_to_error)
    }
}

impl<T: Validate> ValidateExt for T {}

/// Converts `validator::ValidationErrors` to `SchemaGateError`.
///
/// Field errors are sorted by field name so the message is stable.
#[must_use]
pub fn validation_errors_to_error(errors: ValidationErrors) -> SchemaGateError {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string);
                format!("{field}: {message}")
            })
        })
        .collect();
    messages.sort();

    SchemaGateError::Validation(messages.join("; "))
}

/// Returns the value of a required string field, or the
/// `"<field> is required"` validation error when it is absent or empty.
pub fn require<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, SchemaGateError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(SchemaGateError::required(field)),
    }
}

/// Common validation functions.
pub mod rules {
    use validator::ValidationError;

    /// Validates that a string is not blank (not empty after trimming).
    pub fn not_blank(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new("not_blank"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::rules::*;
    use super::*;

    #[derive(Validate)]
    struct TtlRequest {
        #[validate(range(min = 1, message = "must be positive"))]
        cache_ttl: u64,
    }

    #[test]
    fn test_not_blank() {
        assert!(not_blank("hello").is_ok());
        assert!(not_blank("   ").is_err());
        assert!(not_blank("").is_err());
    }

    #[test]
    fn test_require_present() {
        assert_eq!(require(Some("SELECT 1"), "query").unwrap(), "SELECT 1");
    }

    #[test]
    fn test_require_missing_or_empty() {
        let err = require(None, "query").unwrap_err();
        assert_eq!(err.to_string(), "query is required");

        let err = require(Some(""), "db_type").unwrap_err();
        assert_eq!(err.to_string(), "db_type is required");
    }

    #[test]
    fn test_validate_request_message() {
        let err = TtlRequest { cache_ttl: 0 }.validate_request().unwrap_err();
        assert_eq!(err.to_string(), "cache_ttl: must be positive");
        assert!(TtlRequest { cache_ttl: 60 }.validate_request().is_ok());
    }
}
