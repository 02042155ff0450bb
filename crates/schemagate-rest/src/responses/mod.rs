//! API response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use schemagate_core::{ErrorResponse, SchemaGateError};
use serde::Serialize;
use std::time::Instant;
use tracing::error;

/// Application error type for Axum.
#[derive(Debug)]
pub struct AppError(pub SchemaGateError);

impl From<SchemaGateError> for AppError {
    fn from(err: SchemaGateError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }

        (status, Json(ErrorResponse::from_error(&self.0))).into_response()
    }
}

/// Result type for Axum handlers.
pub type ApiResult<T> = Result<Json<T>, AppError>;

/// Payload annotated with the time spent producing it.
#[derive(Debug, Clone, Serialize)]
pub struct Timed<T> {
    #[serde(flatten)]
    pub body: T,
    /// Seconds, as a float.
    pub execution_time: f64,
}

impl<T> Timed<T> {
    /// Wraps `body` with the time elapsed since `started`.
    pub fn since(body: T, started: Instant) -> Self {
        Self {
            body,
            execution_time: started.elapsed().as_secs_f64(),
        }
    }
}

/// Helper to create a success response.
pub fn ok<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_timed_flattens_body() {
        let timed = Timed {
            body: json!({"status": "success", "cached": false}),
            execution_time: 0.25,
        };
        assert_eq!(
            serde_json::to_value(timed).unwrap(),
            json!({"status": "success", "cached": false, "execution_time": 0.25})
        );
    }

    #[test]
    fn test_app_error_status() {
        let response = AppError(SchemaGateError::required("query")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AppError(SchemaGateError::internal("boom")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
