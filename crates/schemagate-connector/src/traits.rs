//! Connector trait definitions.

use crate::{DbType, ObjectType, QueryResult};
use async_trait::async_trait;
use schemagate_core::{Interface, SchemaGateResult};

/// Runs raw SQL against a live connection.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Executes a statement and returns its result set or affected row count.
    async fn execute_query(&self, sql: &str) -> SchemaGateResult<QueryResult>;
}

/// An open connection to a target database.
#[async_trait]
pub trait DatabaseConnector: QueryExecutor {
    /// Returns the database family of this connection.
    fn db_type(&self) -> DbType;

    /// Returns the DDL of an object, or of every table when `object_name` is `*`.
    async fn get_ddl(&self, object_name: &str, object_type: &ObjectType) -> SchemaGateResult<String>;

    /// Closes the connection. Further calls fail with a connection error.
    async fn close(&self);
}

/// Opens connectors for a database type and connection string.
#[async_trait]
pub trait ConnectorFactory: Interface + Send + Sync {
    /// Connects to the target database.
    async fn connect(
        &self,
        db_type: DbType,
        connection_string: &str,
    ) -> SchemaGateResult<Box<dyn DatabaseConnector>>;
}
