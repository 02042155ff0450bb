//! Connector value types.

use schemagate_core::{SchemaGateError, SchemaGateResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// A result row keyed by column name.
pub type Record = Map<String, Value>;

/// Supported database families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DbType {
    /// SQL Server / Microsoft Fabric reached over ODBC.
    SqlServer,
    /// PostgreSQL.
    Postgres,
}

impl DbType {
    /// Returns the canonical name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SqlServer => "sqlserver",
            Self::Postgres => "postgres",
        }
    }
}

impl FromStr for DbType {
    type Err = SchemaGateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fabric" | "odbc" | "microsoft_fabric" => Ok(Self::SqlServer),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            _ => Err(SchemaGateError::UnsupportedDatabase(s.to_string())),
        }
    }
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of schema object to extract DDL for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Table,
    View,
    Procedure,
    StoredProcedure,
    Function,
    Trigger,
    Sequence,
    /// Anything else, lowercased.
    Other(String),
}

impl ObjectType {
    /// Returns the lowercase name of the object type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Table => "table",
            Self::View => "view",
            Self::Procedure => "procedure",
            Self::StoredProcedure => "stored_procedure",
            Self::Function => "function",
            Self::Trigger => "trigger",
            Self::Sequence => "sequence",
            Self::Other(name) => name,
        }
    }

    /// Parses an object type, case-insensitively. Never fails.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "table" => Self::Table,
            "view" => Self::View,
            "procedure" => Self::Procedure,
            "stored_procedure" => Self::StoredProcedure,
            "function" => Self::Function,
            "trigger" => Self::Trigger,
            "sequence" => Self::Sequence,
            other => Self::Other(other.to_string()),
        }
    }

    /// Comment returned for object types a dialect cannot render.
    #[must_use]
    pub fn unsupported_comment(&self) -> String {
        format!("-- DDL generation for {} is not supported yet", self.as_str())
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tabular result of a single statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Column names in result order.
    pub columns: Vec<String>,
    /// One object per row.
    pub data: Vec<Record>,
    /// Number of rows returned.
    pub row_count: u64,
    /// Rows affected by a statement without a result set.
    pub affected_rows: u64,
}

impl QueryResult {
    /// Creates a result for a statement that returned rows.
    #[must_use]
    pub fn rows(columns: Vec<String>, data: Vec<Record>) -> Self {
        let row_count = data.len() as u64;
        Self {
            columns,
            data,
            row_count,
            affected_rows: 0,
        }
    }

    /// Creates a result for a statement without a result set.
    #[must_use]
    pub fn affected(affected_rows: u64) -> Self {
        Self {
            affected_rows,
            ..Self::default()
        }
    }

    /// Overrides the reported row count.
    #[must_use]
    pub fn with_row_count(mut self, row_count: u64) -> Self {
        self.row_count = row_count;
        self
    }

    /// Returns true when no rows were returned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the string value of `column` in the first row.
    #[must_use]
    pub fn first_str(&self, column: &str) -> Option<&str> {
        self.data.first().and_then(|row| record_str(row, column))
    }

    /// Returns the string values of `column` across all rows.
    #[must_use]
    pub fn column_strs(&self, column: &str) -> Vec<&str> {
        self.data
            .iter()
            .filter_map(|row| record_str(row, column))
            .collect()
    }
}

/// Reads a string column from a record.
#[must_use]
pub fn record_str<'a>(row: &'a Record, column: &str) -> Option<&'a str> {
    row.get(column).and_then(Value::as_str)
}

/// Reads an integer column, accepting numbers and numeric text.
#[must_use]
pub fn record_i64(row: &Record, column: &str) -> Option<i64> {
    match row.get(column)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

/// Reads a boolean column, accepting bools, 0/1 and their text forms.
#[must_use]
pub fn record_bool(row: &Record, column: &str) -> bool {
    match row.get(column) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64().is_some_and(|v| v != 0),
        Some(Value::String(s)) => matches!(s.trim().to_lowercase().as_str(), "1" | "true" | "t"),
        _ => false,
    }
}

/// Quotes a value as a SQL string literal, doubling embedded quotes.
#[must_use]
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Parses a database type name, mapping failures to the public error.
pub fn parse_db_type(value: &str) -> SchemaGateResult<DbType> {
    value.parse()
}
