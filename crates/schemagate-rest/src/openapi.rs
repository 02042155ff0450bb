//! OpenAPI documentation configuration.

use crate::controllers::{HealthResponse, ReadinessResponse};
use schemagate_core::ErrorResponse;
use schemagate_service::{
    DdlOutcome, DdlRequest, DirectDdlRequest, DirectQueryRequest, HashEncryptRequest,
    HashEncryptResponse, HashTestResponse, HashVerifyRequest, HashVerifyResponse, OutcomeStatus,
    QueryOutcome, QueryRequest,
};
use utoipa::OpenApi;

/// OpenAPI documentation for the SchemaGate API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "SchemaGate API",
        version = "1.0.0",
        description = "Query execution and DDL extraction for PostgreSQL and SQL Server / Microsoft Fabric",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    paths(
        crate::controllers::query_controller::execute_query,
        crate::controllers::query_controller::get_ddl,
        crate::controllers::direct_controller::execute_query_direct,
        crate::controllers::direct_controller::get_ddl_direct,
        crate::controllers::hash_controller::encrypt_connection,
        crate::controllers::hash_controller::verify_connection_hash,
        crate::controllers::hash_controller::test_hash_functionality,
        crate::controllers::health_controller::health_check,
        crate::controllers::health_controller::readiness_check,
        crate::controllers::health_controller::liveness_check,
    ),
    components(
        schemas(
            ErrorResponse,
            QueryRequest,
            DdlRequest,
            DirectQueryRequest,
            DirectDdlRequest,
            OutcomeStatus,
            QueryOutcome,
            DdlOutcome,
            HashEncryptRequest,
            HashEncryptResponse,
            HashVerifyRequest,
            HashVerifyResponse,
            HashTestResponse,
            HealthResponse,
            ReadinessResponse,
        )
    ),
    tags(
        (name = "query", description = "Queries and DDL by connection hash"),
        (name = "direct", description = "Queries and DDL by plain connection string"),
        (name = "hash", description = "Connection hash operations"),
        (name = "health", description = "Health check endpoints")
    )
)]
pub struct ApiDoc;
