//! # SchemaGate Server
//!
//! Main entry point: loads configuration, initialises logging and runs
//! the HTTP server on a multi-threaded runtime sized by `server.workers`.

use schemagate_config::ConfigLoader;
use schemagate_core::logging::init_logging;
use schemagate_server::{app, startup};
use tracing::{error, info};

fn main() {
    let loader = match ConfigLoader::from_default_location() {
        Ok(loader) => loader,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    let config = loader.get_blocking();

    if let Err(e) = init_logging(&config.logging_options()) {
        eprintln!("{}", e);
    }

    startup::print_banner();
    info!("Starting SchemaGate v{}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.app.environment);
    info!("Worker threads: {}", config.server.workers);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.workers.max(1))
        .thread_name("schemagate-worker")
        .enable_all()
        .build();

    let runtime = match runtime {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to build runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(app::run(config)) {
        error!("Application error: {}", e);
        std::process::exit(1);
    }
}
