//! SQL Server connector over ODBC.
//!
//! ODBC handles are blocking, so each connector owns a dedicated OS thread
//! holding its connection on the shared environment. Statements are sent to
//! it over a channel.

use super::environment::shared_environment;
use super::sqlserver;
use super::values::{text_to_json, ColumnKind};
use crate::{ConnectorOptions, DatabaseConnector, DbType, ObjectType, QueryExecutor, QueryResult, Record};
use async_trait::async_trait;
use odbc_api::buffers::TextRowSet;
use odbc_api::{ConnectionOptions, Cursor, ResultSetMetadata};
use schemagate_core::{SchemaGateError, SchemaGateResult};
use serde_json::Value;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::thread::JoinHandle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

type Reply = oneshot::Sender<SchemaGateResult<QueryResult>>;

struct Statement {
    sql: String,
    reply: Reply,
}

#[derive(Debug, Clone, Copy)]
struct FetchLimits {
    batch_size: usize,
    max_text_len: usize,
}

/// Connection to SQL Server or Microsoft Fabric through the ODBC driver manager.
pub struct OdbcConnector {
    sender: Mutex<Option<mpsc::Sender<Statement>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl OdbcConnector {
    /// Opens a connection with an ODBC connection string.
    pub async fn connect(connection_string: &str, options: &ConnectorOptions) -> SchemaGateResult<Self> {
        let (sender, receiver) = mpsc::channel::<Statement>(1);
        let (ready_tx, ready_rx) = oneshot::channel::<SchemaGateResult<()>>();

        let conn_str = connection_string.to_string();
        let login_timeout = u32::try_from(options.connect_timeout.as_secs()).unwrap_or(u32::MAX);
        let limits = FetchLimits {
            batch_size: options.odbc_batch_size.max(1),
            max_text_len: options.odbc_max_text_len.max(1),
        };

        let worker = std::thread::Builder::new()
            .name("odbc-connection".to_string())
            .spawn(move || run_worker(&conn_str, login_timeout, limits, receiver, ready_tx))
            .map_err(|e| SchemaGateError::Internal(format!("Failed to spawn ODBC worker: {}", e)))?;

        // The driver enforces the login timeout; this guards a hung driver.
        let grace = options.connect_timeout + std::time::Duration::from_secs(5);
        let ready = tokio::time::timeout(grace, ready_rx)
            .await
            .map_err(|_| SchemaGateError::Timeout("Timed out connecting to ODBC database".to_string()))?
            .map_err(|_| SchemaGateError::Internal("ODBC worker stopped during connect".to_string()))?;

        if let Err(e) = ready {
            // The worker exits on its own after a failed connect.
            drop(worker.join());
            return Err(e);
        }

        info!("ODBC connection established");
        Ok(Self {
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
        })
    }

    fn sender(&self) -> SchemaGateResult<mpsc::Sender<Statement>> {
        self.sender
            .lock()
            .map_err(|_| SchemaGateError::Internal("ODBC connector lock poisoned".to_string()))?
            .clone()
            .ok_or_else(|| SchemaGateError::Connection("Connection is closed".to_string()))
    }
}

#[async_trait]
impl QueryExecutor for OdbcConnector {
    async fn execute_query(&self, sql: &str) -> SchemaGateResult<QueryResult> {
        let sender = self.sender()?;
        let (reply, response) = oneshot::channel();

        sender
            .send(Statement {
                sql: sql.to_string(),
                reply,
            })
            .await
            .map_err(|_| SchemaGateError::Connection("Connection is closed".to_string()))?;

        response
            .await
            .map_err(|_| SchemaGateError::Internal("ODBC worker stopped".to_string()))?
    }
}

#[async_trait]
impl DatabaseConnector for OdbcConnector {
    fn db_type(&self) -> DbType {
        DbType::SqlServer
    }

    async fn get_ddl(&self, object_name: &str, object_type: &ObjectType) -> SchemaGateResult<String> {
        sqlserver::get_ddl(self, object_name, object_type).await
    }

    async fn close(&self) {
        // Dropping the sender ends the worker loop.
        if let Ok(mut sender) = self.sender.lock() {
            sender.take();
        }
        let worker = self.worker.lock().ok().and_then(|mut w| w.take());
        if let Some(worker) = worker {
            match tokio::task::spawn_blocking(move || worker.join()).await {
                Ok(Ok(())) => debug!("ODBC connection closed"),
                _ => warn!("ODBC worker did not shut down cleanly"),
            }
        }
    }
}

fn run_worker(
    connection_string: &str,
    login_timeout: u32,
    limits: FetchLimits,
    mut receiver: mpsc::Receiver<Statement>,
    ready: oneshot::Sender<SchemaGateResult<()>>,
) {
    let environment = match shared_environment() {
        Ok(env) => env,
        Err(e) => {
            drop(ready.send(Err(e)));
            return;
        }
    };

    let options = ConnectionOptions {
        login_timeout_sec: Some(login_timeout),
        ..ConnectionOptions::default()
    };
    let connection = match environment.connect_with_connection_string(connection_string, options) {
        Ok(conn) => conn,
        Err(e) => {
            drop(ready.send(Err(SchemaGateError::Connection(format!(
                "Failed to connect to ODBC database: {}",
                e
            )))));
            return;
        }
    };

    if ready.send(Ok(())).is_err() {
        return;
    }

    while let Some(statement) = receiver.blocking_recv() {
        let result = execute(&connection, &statement.sql, limits)
            .map_err(|e| SchemaGateError::Database(e.to_string()));
        if statement.reply.send(result).is_err() {
            debug!("ODBC caller went away before the result was ready");
        }
    }
}

fn execute(
    connection: &odbc_api::Connection<'_>,
    sql: &str,
    limits: FetchLimits,
) -> Result<QueryResult, odbc_api::Error> {
    let mut statement = connection.preallocate()?;

    if let Some(cursor) = statement.execute(sql, ())? {
        return read_cursor(cursor, limits);
    }

    Ok(statement_result(statement.row_count()?))
}

/// Result of a statement without a result set.
///
/// The driver's row count doubles as `row_count`, so both counters agree.
fn statement_result(row_count: Option<usize>) -> QueryResult {
    let affected = row_count.unwrap_or(0) as u64;
    QueryResult::affected(affected).with_row_count(affected)
}

/// How a result set is pulled from the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchMode {
    /// Bound text buffers, `batch_size` rows per round trip.
    Batched,
    /// One row at a time with reads that grow to the full value.
    RowByRow,
}

/// Picks batched fetching only when every column fits the text buffer.
///
/// `display_sizes` are in characters; `None` means the driver reports no
/// upper bound, as SQL Server does for `(n)varchar(max)`.
fn fetch_mode(display_sizes: &[Option<usize>], max_text_len: usize) -> FetchMode {
    // Text buffers reserve four bytes per character.
    let fits = |size: &Option<usize>| size.is_some_and(|chars| chars.saturating_mul(4) <= max_text_len);
    if display_sizes.iter().all(fits) {
        FetchMode::Batched
    } else {
        FetchMode::RowByRow
    }
}

fn column_number(index: usize) -> u16 {
    u16::try_from(index).unwrap_or(u16::MAX)
}

fn read_cursor(mut cursor: impl Cursor, limits: FetchLimits) -> Result<QueryResult, odbc_api::Error> {
    let columns: Vec<String> = cursor.column_names()?.collect::<Result<_, _>>()?;

    let mut kinds = Vec::with_capacity(columns.len());
    let mut display_sizes = Vec::with_capacity(columns.len());
    for index in 1..=columns.len() {
        let number = column_number(index);
        kinds.push(ColumnKind::from(cursor.col_data_type(number)?));
        display_sizes.push(cursor.col_display_size(number)?.map(NonZeroUsize::get));
    }

    let data = match fetch_mode(&display_sizes, limits.max_text_len) {
        FetchMode::Batched => read_batched(cursor, &columns, &kinds, limits)?,
        FetchMode::RowByRow => {
            debug!("Result set has unbounded text columns, fetching row by row");
            read_row_by_row(cursor, &columns, &kinds)?
        }
    };

    Ok(QueryResult::rows(columns, data))
}

fn read_batched(
    mut cursor: impl Cursor,
    columns: &[String],
    kinds: &[ColumnKind],
    limits: FetchLimits,
) -> Result<Vec<Record>, odbc_api::Error> {
    let buffer = TextRowSet::for_cursor(limits.batch_size, &mut cursor, Some(limits.max_text_len))?;
    let mut row_set = cursor.bind_buffer(buffer)?;

    let mut data = Vec::new();
    // A value longer than its buffer is an error, never a shortened string.
    while let Some(batch) = row_set.fetch_with_truncation_check(true)? {
        for row in 0..batch.num_rows() {
            let mut record = Record::new();
            for (col, name) in columns.iter().enumerate() {
                let text = batch.at(col, row).map(String::from_utf8_lossy);
                record.insert(name.clone(), text_to_json(kinds[col], text.as_deref()));
            }
            data.push(record);
        }
    }

    Ok(data)
}

fn read_row_by_row(
    mut cursor: impl Cursor,
    columns: &[String],
    kinds: &[ColumnKind],
) -> Result<Vec<Record>, odbc_api::Error> {
    let mut data = Vec::new();
    let mut buf = Vec::new();

    while let Some(mut row) = cursor.next_row()? {
        let mut record = Record::new();
        for (col, name) in columns.iter().enumerate() {
            let value = if row.get_text(column_number(col + 1), &mut buf)? {
                text_to_json(kinds[col], Some(String::from_utf8_lossy(&buf).as_ref()))
            } else {
                Value::Null
            };
            record.insert(name.clone(), value);
        }
        data.push(record);
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_columns_are_batched() {
        let sizes = [Some(10), Some(4000), Some(20)];
        assert_eq!(fetch_mode(&sizes, 64 * 1024), FetchMode::Batched);
    }

    #[test]
    fn test_unbounded_column_falls_back_to_row_by_row() {
        // nvarchar(max) reports no display size
        let sizes = [Some(10), None];
        assert_eq!(fetch_mode(&sizes, 64 * 1024), FetchMode::RowByRow);
    }

    #[test]
    fn test_column_wider_than_buffer_falls_back_to_row_by_row() {
        // 20000 characters need up to 80000 bytes
        let sizes = [Some(20_000)];
        assert_eq!(fetch_mode(&sizes, 64 * 1024), FetchMode::RowByRow);
        assert_eq!(fetch_mode(&sizes, 80_000), FetchMode::Batched);
    }

    #[test]
    fn test_no_columns_is_batched() {
        assert_eq!(fetch_mode(&[], 1), FetchMode::Batched);
    }

    #[test]
    fn test_statement_result_counts_match() {
        let result = statement_result(Some(3));
        assert_eq!(result.affected_rows, 3);
        assert_eq!(result.row_count, 3);
        assert!(result.columns.is_empty());

        let unknown = statement_result(None);
        assert_eq!(unknown.affected_rows, 0);
        assert_eq!(unknown.row_count, 0);
    }
}
