//! Main application router.

use crate::{
    controllers::{direct_controller, hash_controller, health_controller, query_controller},
    middleware::logging_middleware,
    openapi::ApiDoc,
    state::AppState,
};
use axum::{extract::DefaultBodyLimit, middleware, routing::get, Router};
use schemagate_config::ServerConfig;
use schemagate_core::HealthCheck;
use schemagate_service::{DbService, HashService};
use shaku::{HasComponent, Module};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Creates the main application router from a Shaku module.
pub fn create_router<M>(
    module: &M,
    server_config: &ServerConfig,
    health_checks: Vec<Arc<dyn HealthCheck>>,
) -> Router
where
    M: Module + HasComponent<dyn DbService> + HasComponent<dyn HashService>,
{
    let state = AppState::from_module(module, health_checks);
    create_router_with_state(state, server_config)
}

/// Creates the router over an already assembled state.
pub fn create_router_with_state(state: AppState, server_config: &ServerConfig) -> Router {
    let api_router = Router::new()
        .merge(query_controller::router())
        .nest("/direct", direct_controller::router())
        .nest("/hash", hash_controller::router());

    let router = Router::new()
        .merge(health_controller::router())
        .nest("/api", api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(root))
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(server_config.max_body_size))
        .layer(TimeoutLayer::new(server_config.request_timeout()))
        .layer(CompressionLayer::new())
        .layer(create_cors_layer(server_config))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(logging_middleware));

    info!("Router created with REST endpoints and Swagger UI at /swagger-ui");
    router
}

fn create_cors_layer(server_config: &ServerConfig) -> CorsLayer {
    if server_config.cors_enabled {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    }
}

async fn root() -> &'static str {
    "SchemaGate API"
}
