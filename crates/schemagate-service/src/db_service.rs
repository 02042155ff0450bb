//! Query and DDL service trait definition.

use crate::dto::{DdlCommand, DdlOutcome, QueryCommand, QueryOutcome};
use async_trait::async_trait;
use schemagate_core::Interface;

/// Runs queries and DDL lookups against target databases.
///
/// Database failures are part of the outcome, not errors.
#[async_trait]
pub trait DbService: Interface + Send + Sync {
    /// Executes a query, serving it from the cache when enabled.
    async fn execute_query(&self, command: QueryCommand) -> QueryOutcome;

    /// Extracts DDL, serving it from the cache when enabled.
    async fn get_ddl(&self, command: DdlCommand) -> DdlOutcome;
}
