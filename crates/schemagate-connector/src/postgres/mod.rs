//! PostgreSQL connector.

mod connection_string;
mod connector;
pub mod ddl;

pub use connection_string::parse_connection_string;
pub use connector::{text_to_json, PostgresConnector};
