//! Connector factory.

use crate::{ConnectorFactory, DatabaseConnector, DbType, OdbcConnector, PostgresConnector};
use async_trait::async_trait;
use schemagate_config::DatabaseConfig;
use schemagate_core::SchemaGateResult;
use shaku::Component;
use std::time::Duration;
use tracing::debug;

/// Options applied to every connection a factory opens.
#[derive(Debug, Clone)]
pub struct ConnectorOptions {
    /// Time allowed to establish a connection.
    pub connect_timeout: Duration,
    /// Server-side statement timeout (PostgreSQL only).
    pub statement_timeout: Option<Duration>,
    /// Rows fetched per ODBC round trip.
    pub odbc_batch_size: usize,
    /// Upper bound for a single ODBC text value.
    pub odbc_max_text_len: usize,
}

impl Default for ConnectorOptions {
    fn default() -> Self {
        Self::from(&DatabaseConfig::default())
    }
}

impl From<&DatabaseConfig> for ConnectorOptions {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            connect_timeout: config.connect_timeout(),
            statement_timeout: config.statement_timeout(),
            odbc_batch_size: config.odbc_batch_size,
            odbc_max_text_len: config.odbc_max_text_len,
        }
    }
}

/// Opens PostgreSQL connections with sqlx and SQL Server connections over ODBC.
#[derive(Component, Clone, Default)]
#[shaku(interface = ConnectorFactory)]
pub struct SqlConnectorFactory {
    options: ConnectorOptions,
}

impl SqlConnectorFactory {
    /// Creates a factory with the given options.
    #[must_use]
    pub fn new(options: ConnectorOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl ConnectorFactory for SqlConnectorFactory {
    async fn connect(
        &self,
        db_type: DbType,
        connection_string: &str,
    ) -> SchemaGateResult<Box<dyn DatabaseConnector>> {
        debug!("Opening {} connection", db_type);
        match db_type {
            DbType::Postgres => Ok(Box::new(
                PostgresConnector::connect(connection_string, &self.options).await?,
            )),
            DbType::SqlServer => Ok(Box::new(
                OdbcConnector::connect(connection_string, &self.options).await?,
            )),
        }
    }
}
