//! Connection-hash endpoints.

use crate::{
    extractors::JsonBody,
    responses::{ok, ApiResult},
    state::AppState,
};
use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use schemagate_core::{require, ErrorResponse, SchemaGateError};
use schemagate_service::{
    HashEncryptRequest, HashEncryptResponse, HashTestResponse, HashVerifyRequest,
    HashVerifyResponse,
};
use tracing::debug;

/// Message returned when a hash does not unseal.
pub const INVALID_HASH: &str = "Invalid hash or decryption failed";

/// Creates the hash router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/encrypt", post(encrypt_connection))
        .route("/verify", post(verify_connection_hash))
        .route("/test", get(test_hash_functionality))
}

/// Seal a connection string into a connection hash.
#[utoipa::path(
    post,
    path = "/api/hash/encrypt",
    tag = "hash",
    request_body = HashEncryptRequest,
    responses(
        (status = 200, description = "Connection hash", body = HashEncryptResponse),
        (status = 400, description = "Missing connection string", body = ErrorResponse)
    )
)]
pub async fn encrypt_connection(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<HashEncryptRequest>,
) -> ApiResult<HashEncryptResponse> {
    let connection_string = require(request.connection_string.as_deref(), "connection_string")?;
    ok(state.hash_service.encrypt(connection_string).await?)
}

/// Open a connection hash.
#[utoipa::path(
    post,
    path = "/api/hash/verify",
    tag = "hash",
    request_body = HashVerifyRequest,
    responses(
        (status = 200, description = "Connection string", body = HashVerifyResponse),
        (status = 400, description = "Missing or invalid hash", body = ErrorResponse)
    )
)]
pub async fn verify_connection_hash(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<HashVerifyRequest>,
) -> ApiResult<HashVerifyResponse> {
    let hash = require(request.hash.as_deref(), "hash")?;
    let response = state.hash_service.verify(hash).await.map_err(|e| {
        debug!("Hash verification failed: {}", e);
        SchemaGateError::validation(INVALID_HASH)
    })?;
    ok(response)
}

/// Round-trip a sample connection string through the hash system.
#[utoipa::path(
    get,
    path = "/api/hash/test",
    tag = "hash",
    responses(
        (status = 200, description = "Self-test report", body = HashTestResponse)
    )
)]
pub async fn test_hash_functionality(State(state): State<AppState>) -> ApiResult<HashTestResponse> {
    ok(state.hash_service.self_test().await)
}
