//! Query and DDL endpoints addressed by connection hash.

use crate::{
    extractors::JsonBody,
    responses::{ok, ApiResult, Timed},
    state::AppState,
};
use axum::{extract::State, routing::post, Router};
use schemagate_core::{ErrorResponse, SchemaGateError, SchemaGateResult};
use schemagate_service::{DdlOutcome, DdlRequest, QueryOutcome, QueryRequest};
use std::time::Instant;
use tracing::debug;

/// Message returned when a connection hash does not unseal.
pub const INVALID_CONNECTION_HASH: &str = "Invalid connection hash";

/// Creates the query router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/query", post(execute_query))
        .route("/ddl", post(get_ddl))
}

fn resolve_hash(state: &AppState, hash: &str) -> SchemaGateResult<String> {
    state.hash_service.resolve(hash).map_err(|e| {
        debug!("Connection hash rejected: {}", e);
        SchemaGateError::validation(INVALID_CONNECTION_HASH)
    })
}

/// Execute a query.
#[utoipa::path(
    post,
    path = "/api/query",
    tag = "query",
    request_body = QueryRequest,
    responses(
        (status = 200, description = "Query payload; database failures have status \"error\"", body = QueryOutcome),
        (status = 400, description = "Missing field or invalid connection hash", body = ErrorResponse)
    )
)]
pub async fn execute_query(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<QueryRequest>,
) -> ApiResult<Timed<QueryOutcome>> {
    let connection_string = resolve_hash(&state, request.check()?)?;
    let command = request.into_command(connection_string);

    let started = Instant::now();
    let outcome = state.db_service.execute_query(command).await;
    ok(Timed::since(outcome, started))
}

/// Get DDL for database objects.
#[utoipa::path(
    post,
    path = "/api/ddl",
    tag = "query",
    request_body = DdlRequest,
    responses(
        (status = 200, description = "DDL payload; database failures have status \"error\"", body = DdlOutcome),
        (status = 400, description = "Missing field or invalid connection hash", body = ErrorResponse)
    )
)]
pub async fn get_ddl(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<DdlRequest>,
) -> ApiResult<Timed<DdlOutcome>> {
    let connection_string = resolve_hash(&state, request.check()?)?;
    let command = request.into_command(connection_string);
    debug!(
        "DDL request for {} of type {}",
        command.object_name, command.object_type
    );

    let started = Instant::now();
    let outcome = state.db_service.get_ddl(command).await;
    ok(Timed::since(outcome, started))
}
