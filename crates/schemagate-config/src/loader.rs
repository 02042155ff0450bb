//! Configuration loader with layered sources.

use crate::{AppConfig, ConfigValidator};
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use schemagate_core::SchemaGateError;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Prefix of structured environment overrides (`SCHEMAGATE_SERVER__PORT`).
pub const ENV_PREFIX: &str = "SCHEMAGATE";

/// Configuration loader with runtime refresh support.
#[derive(Clone)]
pub struct ConfigLoader {
    config: Arc<RwLock<AppConfig>>,
    config_dir: String,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// Configuration is loaded from multiple sources in order:
    /// 1. `config/default.toml` - Default values
    /// 2. `config/{environment}.toml` - Environment-specific overrides
    /// 3. `config/local.toml` - Local overrides
    /// 4. Environment variables with `SCHEMAGATE_` prefix
    /// 5. Plain deployment variables (`REDIS_HOST`, `HASH_SECRET`, `DEBUG`, ...)
    pub fn new(config_dir: impl Into<String>) -> Result<Self, SchemaGateError> {
        // Load .env file if present
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        Self::with_vars(config_dir, std::env::vars().collect())
    }

    /// Creates a loader from an explicit environment snapshot.
    pub fn with_vars(
        config_dir: impl Into<String>,
        vars: HashMap<String, String>,
    ) -> Result<Self, SchemaGateError> {
        let config_dir = config_dir.into();
        let config = Self::load_config(&config_dir, &vars)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_dir,
        })
    }

    /// Loads configuration from the default location (`./config`).
    pub fn from_default_location() -> Result<Self, SchemaGateError> {
        Self::new("./config")
    }

    /// Returns the current configuration.
    pub async fn get(&self) -> AppConfig {
        self.config.read().await.clone()
    }

    /// Returns the current configuration from synchronous code.
    ///
    /// Must not be called from within an async runtime.
    pub fn get_blocking(&self) -> AppConfig {
        self.config.blocking_read().clone()
    }

    /// Reloads the configuration from disk and the current process environment.
    pub async fn reload(&self) -> Result<(), SchemaGateError> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        let new_config = Self::load_config(&self.config_dir, &vars)?;
        let mut config = self.config.write().await;
        *config = new_config;
        info!("Configuration reloaded successfully");
        Ok(())
    }

    /// Loads configuration from the specified directory.
    fn load_config(
        config_dir: &str,
        vars: &HashMap<String, String>,
    ) -> Result<AppConfig, SchemaGateError> {
        let environment = vars
            .get("SCHEMAGATE_ENVIRONMENT")
            .cloned()
            .unwrap_or_else(|| "development".to_string());

        info!("Loading configuration for environment: {}", environment);

        let mut builder = Config::builder();

        for name in ["default", environment.as_str(), "local"] {
            let path = format!("{}/{}.toml", config_dir, name);
            if Path::new(&path).exists() {
                debug!("Loading config from: {}", path);
                builder = builder.add_source(File::with_name(&path).required(false));
            }
        }

        let structured: config::Map<String, String> = vars
            .iter()
            .filter(|(key, _)| key.starts_with(ENV_PREFIX))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        builder = builder
            .set_override("app.environment", environment.clone())
            .map_err(config_error)?
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(structured)),
            );

        builder = apply_deployment_overrides(builder, vars)?;

        let app_config: AppConfig = builder
            .build()
            .map_err(config_error)?
            .try_deserialize()
            .map_err(config_error)?;

        Self::validate_config(&app_config)?;

        Ok(app_config)
    }

    /// Validates the configuration.
    fn validate_config(config: &AppConfig) -> Result<(), SchemaGateError> {
        if config.app.environment == "production" && config.security.uses_default_secret() {
            warn!("Using default HASH_SECRET in production! Connection hashes can be forged.");
        }

        ConfigValidator::validate(config).map_err(|errors| {
            let message = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            SchemaGateError::Configuration(message)
        })
    }

    /// Gets a specific configuration value by key path.
    pub async fn get_value<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let config = self.config.read().await;
        let json = serde_json::to_value(&*config).ok()?;

        let mut current = &json;
        for part in key.split('.') {
            current = current.get(part)?;
        }

        serde_json::from_value(current.clone()).ok()
    }
}

/// Applies the plain variables set by the deployment manifests.
///
/// These win over every other source.
fn apply_deployment_overrides<St: config::builder::BuilderState>(
    mut builder: ConfigBuilder<St>,
    vars: &HashMap<String, String>,
) -> Result<ConfigBuilder<St>, SchemaGateError> {
    if let Some(host) = non_empty(vars, "REDIS_HOST") {
        builder = builder.set_override("redis.host", host).map_err(config_error)?;
    }

    if let Some(port) = non_empty(vars, "REDIS_PORT") {
        let port: u16 = port.trim().parse().map_err(|_| {
            SchemaGateError::Configuration(format!("REDIS_PORT must be a port number, got '{}'", port))
        })?;
        builder = builder
            .set_override("redis.port", i64::from(port))
            .map_err(config_error)?;
    }

    if let Some(password) = non_empty(vars, "REDIS_PASSWORD") {
        builder = builder
            .set_override("redis.password", password)
            .map_err(config_error)?;
    }

    if let Some(db) = non_empty(vars, "REDIS_DB") {
        let db: u32 = db.trim().parse().map_err(|_| {
            SchemaGateError::Configuration(format!("REDIS_DB must be a number, got '{}'", db))
        })?;
        builder = builder
            .set_override("redis.db", i64::from(db))
            .map_err(config_error)?;
    }

    // An empty secret would sign hashes with no key at all.
    if let Some(secret) = vars.get("HASH_SECRET") {
        if secret.is_empty() {
            return Err(SchemaGateError::Configuration(
                "HASH_SECRET is set but empty; unset it or provide a secret".to_string(),
            ));
        }
        builder = builder
            .set_override("security.hash_secret", secret.clone())
            .map_err(config_error)?;
    }

    if let Some(flag) = vars.get("DEBUG") {
        let debug = parse_flag(flag).ok_or_else(|| {
            SchemaGateError::Configuration(format!("DEBUG must be a boolean, got '{}'", flag))
        })?;
        builder = builder.set_override("app.debug", debug).map_err(config_error)?;
    }

    Ok(builder)
}

fn non_empty(vars: &HashMap<String, String>, key: &str) -> Option<String> {
    vars.get(key).filter(|v| !v.is_empty()).cloned()
}

/// Parses a boolean flag the way shell environments spell them.
#[must_use]
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn config_error(err: ConfigError) -> SchemaGateError {
    SchemaGateError::Configuration(err.to_string())
}
