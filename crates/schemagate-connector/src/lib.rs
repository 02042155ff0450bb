//! # SchemaGate Connector
//!
//! Connections to the target databases and DDL extraction.
//!
//! ```text
//! DbService
//!   ↓  Arc<dyn ConnectorFactory>
//! SqlConnectorFactory
//!   ├─ PostgresConnector   (sqlx, simple query protocol)
//!   └─ OdbcConnector       (odbc-api, one worker thread per connection)
//! ```
//!
//! DDL generation runs against any [`QueryExecutor`], so both dialects are
//! tested without a live database.

pub mod driver_registry;
pub mod factory;
pub mod odbc;
pub mod postgres;
pub mod traits;
pub mod types;

#[cfg(test)]
mod testing;

pub use driver_registry::*;
pub use factory::*;
pub use odbc::OdbcConnector;
pub use postgres::PostgresConnector;
pub use traits::*;
pub use types::*;
