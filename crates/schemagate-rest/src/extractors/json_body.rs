//! JSON body extractor with the API's error contract.
//!
//! A missing, unparseable or empty JSON object body is answered with
//! 400 `{"error": "No request data provided"}`. A body over the size
//! limit is answered with 413. Fields of the wrong type are reported as
//! validation errors.

use crate::responses::AppError;
use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::StatusCode,
    Json,
};
use schemagate_core::SchemaGateError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// Message returned when the body carries no usable JSON object.
pub const NO_REQUEST_DATA: &str = "No request data provided";

/// Message returned when the body exceeds the size limit.
pub const BODY_TOO_LARGE: &str = "Request body too large";

/// JSON extractor that rejects with [`AppError`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state).await.map_err(|rejection| {
            debug!("Rejected request body: {}", rejection);
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                AppError(SchemaGateError::PayloadTooLarge(BODY_TOO_LARGE.to_string()))
            } else {
                AppError(SchemaGateError::validation(NO_REQUEST_DATA))
            }
        })?;

        let has_data = match &value {
            Value::Object(map) => !map.is_empty(),
            _ => false,
        };
        if !has_data {
            return Err(AppError(SchemaGateError::validation(NO_REQUEST_DATA)));
        }

        serde_json::from_value(value)
            .map(JsonBody)
            .map_err(|e| AppError(SchemaGateError::validation(e.to_string())))
    }
}
