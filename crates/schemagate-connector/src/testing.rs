//! Scripted executor for DDL tests.

use crate::{QueryExecutor, QueryResult, Record};
use async_trait::async_trait;
use schemagate_core::SchemaGateResult;
use serde_json::Value;
use std::sync::Mutex;

type Script = dyn Fn(&str) -> SchemaGateResult<QueryResult> + Send + Sync;

/// Answers each statement through a closure and records what ran.
pub(crate) struct ScriptedExecutor {
    script: Box<Script>,
    executed: Mutex<Vec<String>>,
}

impl ScriptedExecutor {
    pub(crate) fn new(
        script: impl Fn(&str) -> SchemaGateResult<QueryResult> + Send + Sync + 'static,
    ) -> Self {
        Self {
            script: Box::new(script),
            executed: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryExecutor for ScriptedExecutor {
    async fn execute_query(&self, sql: &str) -> SchemaGateResult<QueryResult> {
        self.executed.lock().unwrap().push(sql.to_string());
        (self.script)(sql)
    }
}

/// Builds a row result from JSON objects, taking columns from the first row.
pub(crate) fn rows(objects: Vec<Value>) -> QueryResult {
    let data: Vec<Record> = objects
        .into_iter()
        .filter_map(|v| match v {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect();
    let columns = data
        .first()
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default();
    QueryResult::rows(columns, data)
}
