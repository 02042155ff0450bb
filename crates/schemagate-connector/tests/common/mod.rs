//! Common test infrastructure for database integration tests.

use schemagate_connector::{ConnectorOptions, PostgresConnector};
use testcontainers::{runners::AsyncRunner, ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;

/// Test database container wrapper.
///
/// Manages a PostgreSQL testcontainer lifecycle and hands out connectors.
pub struct TestDatabase {
    _container: ContainerAsync<Postgres>,
    connection_string: String,
}

impl TestDatabase {
    /// Creates a new test database with a fresh PostgreSQL container.
    pub async fn new() -> Self {
        let container = Postgres::default()
            .with_tag("16-alpine")
            .start()
            .await
            .expect("Failed to start PostgreSQL container");

        let port = container
            .get_host_port_ipv4(5432)
            .await
            .expect("Failed to get PostgreSQL port");

        let connection_string = format!(
            "host=127.0.0.1 port={} dbname=postgres user=postgres password=postgres sslmode=disable",
            port
        );

        Self {
            _container: container,
            connection_string,
        }
    }

    /// Returns the key/value connection string of the container.
    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    /// Opens a connector with retry while the server finishes starting.
    pub async fn connect(&self) -> PostgresConnector {
        let options = ConnectorOptions::default();
        let mut attempts = 0;
        loop {
            attempts += 1;
            match PostgresConnector::connect(&self.connection_string, &options).await {
                Ok(connector) => return connector,
                Err(e) => {
                    if attempts >= 30 {
                        panic!("Failed to connect to database after 30 attempts: {}", e);
                    }
                    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                }
            }
        }
    }
}
