//! Query and DDL endpoints taking a plain connection string.

use crate::{
    extractors::JsonBody,
    responses::{ok, ApiResult, Timed},
    state::AppState,
};
use axum::{extract::State, routing::post, Router};
use schemagate_core::ErrorResponse;
use schemagate_service::{DdlOutcome, DirectDdlRequest, DirectQueryRequest, QueryOutcome};
use std::time::Instant;

/// Creates the direct-connection router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/query", post(execute_query_direct))
        .route("/ddl", post(get_ddl_direct))
}

/// Execute a query with a plain connection string.
#[utoipa::path(
    post,
    path = "/api/direct/query",
    tag = "direct",
    request_body = DirectQueryRequest,
    responses(
        (status = 200, description = "Query payload", body = QueryOutcome),
        (status = 400, description = "Missing field", body = ErrorResponse)
    )
)]
pub async fn execute_query_direct(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<DirectQueryRequest>,
) -> ApiResult<Timed<QueryOutcome>> {
    let command = request.into_command()?;

    let started = Instant::now();
    let outcome = state.db_service.execute_query(command).await;
    ok(Timed::since(outcome, started))
}

/// Get DDL with a plain connection string.
#[utoipa::path(
    post,
    path = "/api/direct/ddl",
    tag = "direct",
    request_body = DirectDdlRequest,
    responses(
        (status = 200, description = "DDL payload", body = DdlOutcome),
        (status = 400, description = "Missing field", body = ErrorResponse)
    )
)]
pub async fn get_ddl_direct(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<DirectDdlRequest>,
) -> ApiResult<Timed<DdlOutcome>> {
    let command = request.into_command()?;

    let started = Instant::now();
    let outcome = state.db_service.get_ddl(command).await;
    ok(Timed::since(outcome, started))
}
