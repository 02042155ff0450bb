//! Application assembly and HTTP serving.

use crate::di::{build_app_module, health_checks, ServiceResolver};
use crate::startup;
use axum::Router;
use schemagate_config::AppConfig;
use schemagate_core::{SchemaGateError, SchemaGateResult};
use schemagate_rest::create_router;
use std::future::Future;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

/// Builds the application and serves it until SIGINT/SIGTERM.
pub async fn run(config: AppConfig) -> SchemaGateResult<()> {
    startup::warn_on_insecure_settings(&config);
    startup::report_odbc_driver(&config);

    let module = build_app_module(&config)?;

    let cache = module.cache();
    if cache.is_enabled() {
        match cache.ping().await {
            Ok(()) => info!("Redis reachable at {}", config.redis.redacted_url()),
            Err(e) => warn!("Redis not reachable yet, caching will be skipped: {}", e),
        }
    }

    let checks = health_checks(&module, &config);
    let router = create_router(module.as_ref(), &config.server, checks);

    let addr = config.server.addr();
    let listener = bind(&addr).await?;
    startup::print_startup_info(&addr);

    serve(listener, router, shutdown_signal()).await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Binds the listening socket.
pub async fn bind(addr: &str) -> SchemaGateResult<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| SchemaGateError::Internal(format!("Failed to bind {}: {}", addr, e)))
}

/// Serves `router` until `shutdown` completes.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> SchemaGateResult<()> {
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| SchemaGateError::Internal(format!("REST server error: {}", e)))
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        }
    }
}
