//! Health check controller.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use schemagate_core::HealthStatus;
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status.
    pub status: String,
    /// Application version.
    pub version: String,
}

/// Readiness response with one entry per dependency.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadinessResponse {
    /// `ready`, `degraded` or `not_ready`.
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    #[schema(value_type = Object)]
    pub checks: BTreeMap<String, HealthStatus>,
}

/// Creates the health router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/live", get(liveness_check))
}

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness check endpoint.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Service is ready or degraded", body = ReadinessResponse),
        (status = 503, description = "A dependency is unhealthy", body = ReadinessResponse)
    )
)]
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let results = join_all(state.health_checks.iter().map(|check| async move {
        (check.name().to_string(), check.check().await)
    }))
    .await;
    let checks: BTreeMap<String, HealthStatus> = results.into_iter().collect();

    let (code, status) = if checks.values().any(HealthStatus::is_unhealthy) {
        (StatusCode::SERVICE_UNAVAILABLE, "not_ready")
    } else if checks.values().all(HealthStatus::is_healthy) {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::OK, "degraded")
    };

    let body = ReadinessResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        checks,
    };
    (code, Json(body))
}

/// Liveness check endpoint.
#[utoipa::path(
    get,
    path = "/live",
    tag = "health",
    responses(
        (status = 200, description = "Service is alive")
    )
)]
pub async fn liveness_check() -> impl IntoResponse {
    StatusCode::OK
}
