//! Process-wide ODBC environment.
//!
//! The driver manager allows a single environment per process. Every
//! connection and driver lookup borrows this one.

use odbc_api::Environment;
use schemagate_core::{SchemaGateError, SchemaGateResult};
use std::sync::OnceLock;

static ENVIRONMENT: OnceLock<Result<Environment, String>> = OnceLock::new();

/// Returns the shared environment, creating it on first use.
///
/// A failure to create it (no driver manager installed) is remembered.
pub fn shared_environment() -> SchemaGateResult<&'static Environment> {
    ENVIRONMENT
        .get_or_init(|| Environment::new().map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|e| SchemaGateError::Connection(format!("Failed to initialise ODBC environment: {}", e)))
}
