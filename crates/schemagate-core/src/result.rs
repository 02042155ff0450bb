//! Result type aliases for SchemaGate.

use crate::SchemaGateError;

/// A specialized `Result` type for SchemaGate operations.
pub type SchemaGateResult<T> = Result<T, SchemaGateError>;
