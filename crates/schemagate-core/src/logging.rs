//! Logging initialisation for `tracing`.
//!
//! The subscriber honours `RUST_LOG` first; without it the filter is derived
//! from the configured level, raised to `debug` when debug mode is on.

use crate::{SchemaGateError, SchemaGateResult};
use serde::{Deserialize, Serialize};

/// Output format of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-field lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingOptions {
    /// Base level (trace, debug, info, warn, error).
    pub level: String,
    /// Line format.
    pub format: LogFormat,
    /// Debug mode raises the crate level to `debug`.
    pub debug: bool,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            debug: false,
        }
    }
}

impl LoggingOptions {
    /// Returns the default `EnvFilter` directive string.
    #[must_use]
    pub fn filter_directive(&self) -> String {
        let level = if self.debug { "debug" } else { self.level.as_str() };
        format!("{level},schemagate={level},tower_http=debug,sqlx=warn")
    }
}

/// Installs the global `tracing` subscriber.
#[cfg(feature = "logging")]
pub fn init_logging(options: &LoggingOptions) -> SchemaGateResult<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(options.filter_directive()));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match options.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init(),
    };

    result.map_err(|e| SchemaGateError::Internal(format!("Failed to initialise logging: {}", e)))
}

/// Placeholder for when the logging feature is disabled.
#[cfg(not(feature = "logging"))]
pub fn init_logging(_options: &LoggingOptions) -> SchemaGateResult<()> {
    Ok(())
}
