//! PostgreSQL connector over a single sqlx connection.

use super::{ddl, parse_connection_string};
use crate::{ConnectorOptions, DatabaseConnector, DbType, ObjectType, QueryExecutor, QueryResult, Record};
use async_trait::async_trait;
use futures::TryStreamExt;
use schemagate_core::{SchemaGateError, SchemaGateResult};
use serde_json::Value;
use sqlx::postgres::{PgConnection, PgRow};
use sqlx::{Column, ConnectOptions, Connection, Either, Executor, Row, Statement, TypeInfo};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Connection to a PostgreSQL database.
///
/// Statements run over the simple query protocol, so multi-statement
/// scripts and dollar-quoted bodies are sent unchanged.
pub struct PostgresConnector {
    conn: Mutex<Option<PgConnection>>,
}

impl PostgresConnector {
    /// Connects using a URI or key/value connection string.
    pub async fn connect(connection_string: &str, options: &ConnectorOptions) -> SchemaGateResult<Self> {
        let mut connect_options = parse_connection_string(connection_string)?;
        if let Some(timeout) = options.statement_timeout {
            connect_options = connect_options
                .options([("statement_timeout", timeout.as_millis().to_string())]);
        }

        let conn = tokio::time::timeout(options.connect_timeout, connect_options.connect())
            .await
            .map_err(|_| SchemaGateError::Timeout("Timed out connecting to PostgreSQL".to_string()))?
            .map_err(|e| {
                warn!("Failed to connect to PostgreSQL: {}", e);
                SchemaGateError::Connection(format!("Failed to connect to PostgreSQL database: {}", e))
            })?;

        info!("PostgreSQL connection established");
        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }
}

#[async_trait]
impl QueryExecutor for PostgresConnector {
    async fn execute_query(&self, sql: &str) -> SchemaGateResult<QueryResult> {
        let mut guard = self.conn.lock().await;
        let conn = guard
            .as_mut()
            .ok_or_else(|| SchemaGateError::Connection("Connection is closed".to_string()))?;

        debug!("Executing PostgreSQL statement ({} bytes)", sql.len());

        let mut stream = sqlx::raw_sql(sql).fetch_many(&mut *conn);
        let mut pending: Vec<PgRow> = Vec::new();
        let mut result = QueryResult::default();
        let mut empty_result_set = false;

        // The last statement of a script determines the result.
        while let Some(step) = stream.try_next().await? {
            match step {
                Either::Left(done) => {
                    empty_result_set = pending.is_empty() && done.rows_affected() == 0;
                    result = if pending.is_empty() {
                        QueryResult::affected(done.rows_affected())
                    } else {
                        rows_to_result(&std::mem::take(&mut pending))?
                    };
                }
                Either::Right(row) => pending.push(row),
            }
        }
        drop(stream);
        if !pending.is_empty() {
            result = rows_to_result(&pending)?;
            empty_result_set = false;
        }

        // A query without rows still reports its columns.
        if empty_result_set {
            if let Some(columns) = describe_columns(conn, sql).await {
                result = QueryResult::rows(columns, Vec::new());
            }
        }

        Ok(result)
    }
}

#[async_trait]
impl DatabaseConnector for PostgresConnector {
    fn db_type(&self) -> DbType {
        DbType::Postgres
    }

    async fn get_ddl(&self, object_name: &str, object_type: &ObjectType) -> SchemaGateResult<String> {
        ddl::get_ddl(self, object_name, object_type).await
    }

    async fn close(&self) {
        if let Some(conn) = self.conn.lock().await.take() {
            if let Err(e) = conn.close().await {
                debug!("Error closing PostgreSQL connection: {}", e);
            }
        }
    }
}

/// Reads the column names of a statement by preparing it without running it.
///
/// Scripts with several statements cannot be prepared and yield `None`.
async fn describe_columns(conn: &mut PgConnection, sql: &str) -> Option<Vec<String>> {
    match (&mut *conn).prepare(sql).await {
        Ok(statement) => {
            let columns: Vec<String> = statement
                .columns()
                .iter()
                .map(|c| c.name().to_string())
                .collect();
            (!columns.is_empty()).then_some(columns)
        }
        Err(e) => {
            debug!("Could not describe statement: {}", e);
            None
        }
    }
}

fn rows_to_result(rows: &[PgRow]) -> SchemaGateResult<QueryResult> {
    let Some(first) = rows.first() else {
        return Ok(QueryResult::default());
    };

    let columns: Vec<(String, String)> = first
        .columns()
        .iter()
        .map(|c| (c.name().to_string(), c.type_info().name().to_string()))
        .collect();

    let mut data = Vec::with_capacity(rows.len());
    for row in rows {
        let mut record = Record::new();
        for (index, (name, type_name)) in columns.iter().enumerate() {
            let text: Option<String> = row.try_get_unchecked(index)?;
            record.insert(name.clone(), text_to_json(type_name, text.as_deref()));
        }
        data.push(record);
    }

    Ok(QueryResult::rows(
        columns.into_iter().map(|(name, _)| name).collect(),
        data,
    ))
}

/// Converts a text-format PostgreSQL value into JSON by its type name.
#[must_use]
pub fn text_to_json(type_name: &str, text: Option<&str>) -> Value {
    let Some(text) = text else {
        return Value::Null;
    };

    match type_name {
        "BOOL" => match text {
            "t" | "true" => Value::Bool(true),
            "f" | "false" => Value::Bool(false),
            _ => Value::String(text.to_string()),
        },
        "INT2" | "INT4" | "INT8" | "OID" => text
            .parse::<i64>()
            .map_or_else(|_| Value::String(text.to_string()), Value::from),
        "FLOAT4" | "FLOAT8" => text
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map_or_else(|| Value::String(text.to_string()), Value::Number),
        "JSON" | "JSONB" => {
            serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
        }
        _ => Value::String(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_to_json_scalars() {
        assert_eq!(text_to_json("BOOL", Some("t")), json!(true));
        assert_eq!(text_to_json("BOOL", Some("f")), json!(false));
        assert_eq!(text_to_json("INT4", Some("42")), json!(42));
        assert_eq!(text_to_json("INT8", Some("-9000000000")), json!(-9_000_000_000_i64));
        assert_eq!(text_to_json("FLOAT8", Some("1.5")), json!(1.5));
        assert_eq!(text_to_json("TEXT", Some("hello")), json!("hello"));
        assert_eq!(text_to_json("INT4", None), Value::Null);
    }

    #[test]
    fn test_text_to_json_keeps_exact_types_as_text() {
        assert_eq!(text_to_json("NUMERIC", Some("12.3400")), json!("12.3400"));
        assert_eq!(text_to_json("TIMESTAMPTZ", Some("2024-01-01 00:00:00+00")), json!("2024-01-01 00:00:00+00"));
        assert_eq!(text_to_json("FLOAT8", Some("NaN")), json!("NaN"));
    }

    #[test]
    fn test_text_to_json_parses_json_columns() {
        assert_eq!(text_to_json("JSONB", Some(r#"{"a": [1, 2]}"#)), json!({"a": [1, 2]}));
        assert_eq!(text_to_json("JSON", Some("not json")), json!("not json"));
    }
}
