//! SQL Server / Microsoft Fabric connector over ODBC.

mod connector;
mod environment;
pub mod sqlserver;
mod values;

pub use connector::OdbcConnector;
pub use environment::shared_environment;
pub use values::{text_to_json, ColumnKind};
