//! Server startup utilities.

use schemagate_config::AppConfig;
use schemagate_connector::DriverLookup;
use tracing::{info, warn};

/// Prints the startup banner.
pub fn print_banner() {
    info!(r#"
   _____      __                          ______      __
  / ___/_____/ /_  ___  ____ ___  ____ _/ ____/___ _/ /____
  \__ \/ ___/ __ \/ _ \/ __ `__ \/ __ `/ / __/ __ `/ __/ _ \
 ___/ / /__/ / / /  __/ / / / / / /_/ / /_/ / /_/ / /_/  __/
/____/\___/_/ /_/\___/_/ /_/ /_/\__,_/\____/\__,_/\__/\___/
    "#);
}

/// Prints server startup information.
pub fn print_startup_info(addr: &str) {
    let separator = "=".repeat(60);
    info!("{}", separator);
    info!("REST API:  http://{}/api", addr);
    info!("Health:    http://{}/health", addr);
    info!("API Docs:  http://{}/swagger-ui", addr);
    info!("{}", separator);
}

/// Logs whether the configured ODBC driver is registered.
///
/// Returns true when SQL Server connections can be opened.
pub fn report_odbc_driver(config: &AppConfig) -> bool {
    let name = &config.database.odbc_driver_name;

    match DriverLookup::from(&config.database).resolve() {
        Ok((registry, source)) => match registry.driver_path(name) {
            Some(library) => {
                info!("ODBC driver '{}' registered in {} ({})", name, source, library);
                true
            }
            None if registry.contains(name) => {
                info!("ODBC driver '{}' registered in {}", name, source);
                true
            }
            None => {
                let known: Vec<&str> = registry.names().collect();
                warn!(
                    "ODBC driver '{}' not found in {}; registered drivers: {:?}. SQL Server queries will fail.",
                    name, source, known
                );
                false
            }
        },
        Err(e) => {
            warn!("{}. SQL Server queries will fail.", e);
            false
        }
    }
}

/// Warns about settings that are unsafe outside development.
pub fn warn_on_insecure_settings(config: &AppConfig) {
    if config.security.uses_default_secret() {
        warn!("HASH_SECRET is not set; connection hashes use the built-in default secret");
    }
    if config.redis.enabled && config.redis.password.is_none() {
        warn!("Redis password is not set");
    }
}
