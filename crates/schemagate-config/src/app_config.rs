//! Application configuration structures.

use schemagate_core::logging::{LogFormat, LoggingOptions};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Default hash secret used when `HASH_SECRET` is not provided.
pub const DEFAULT_HASH_SECRET: &str = "default_secret_key_change_me";

/// Name under which the SQL Server ODBC driver is registered.
pub const DEFAULT_ODBC_DRIVER: &str = "ODBC Driver 18 for SQL Server";

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Application name and metadata.
    #[serde(default)]
    pub app: AppMetadata,

    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Redis configuration.
    #[serde(default)]
    pub redis: RedisConfig,

    /// Connection-hash secret configuration.
    #[serde(default)]
    pub security: SecurityConfig,

    /// Target database connector configuration.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Returns the logging options derived from observability and debug settings.
    #[must_use]
    pub fn logging_options(&self) -> LoggingOptions {
        LoggingOptions {
            level: self.observability.log_level.clone(),
            format: self.observability.log_format,
            debug: self.app.debug,
        }
    }
}

/// Application metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppMetadata {
    /// Application name.
    pub name: String,
    /// Application version.
    pub version: String,
    /// Environment (development, staging, production).
    pub environment: String,
    /// Debug mode.
    pub debug: bool,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "schemagate".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "development".to_string(),
            debug: false,
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Number of runtime worker threads.
    pub workers: usize,
    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
    /// Enable CORS.
    pub cors_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            workers: 4,
            request_timeout_secs: 120,
            max_body_size: 2 * 1024 * 1024, // 2MB
            cors_enabled: true,
        }
    }
}

impl ServerConfig {
    /// Returns the bind address.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the request timeout as a Duration.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Redis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Redis host.
    pub host: String,
    /// Redis port.
    pub port: u16,
    /// Optional password (`requirepass`).
    pub password: Option<String>,
    /// Logical database index.
    pub db: u32,
    /// Connection pool size.
    pub pool_size: usize,
    /// Enable Redis (disable to run without a cache).
    pub enabled: bool,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            password: None,
            db: 0,
            pool_size: 16,
            enabled: true,
        }
    }
}

impl RedisConfig {
    /// Builds the connection URL, percent-encoding the password.
    #[must_use]
    pub fn url(&self) -> String {
        let base = format!("redis://{}:{}/{}", self.host, self.port, self.db);
        let Ok(mut url) = Url::parse(&base) else {
            return base;
        };
        if let Some(password) = self.password.as_deref().filter(|p| !p.is_empty()) {
            if url.set_password(Some(password)).is_err() {
                return base;
            }
        }
        url.to_string()
    }

    /// Returns the URL with the password replaced, for logging.
    #[must_use]
    pub fn redacted_url(&self) -> String {
        match self.password.as_deref() {
            Some(p) if !p.is_empty() => {
                format!("redis://:***@{}:{}/{}", self.host, self.port, self.db)
            }
            _ => format!("redis://{}:{}/{}", self.host, self.port, self.db),
        }
    }
}

/// Secret used to sign connection hashes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Signing secret (`HASH_SECRET`).
    pub hash_secret: String,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            hash_secret: DEFAULT_HASH_SECRET.to_string(),
        }
    }
}

impl SecurityConfig {
    /// Returns true when the built-in default secret is in use.
    #[must_use]
    pub fn uses_default_secret(&self) -> bool {
        self.hash_secret == DEFAULT_HASH_SECRET
    }
}

/// Target database connector configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Statement timeout in seconds (0 disables it).
    pub statement_timeout_secs: u64,
    /// Rows fetched per ODBC batch.
    pub odbc_batch_size: usize,
    /// Maximum length of a text value fetched over ODBC.
    pub odbc_max_text_len: usize,
    /// ODBC driver expected to be registered.
    pub odbc_driver_name: String,
    /// Path of the ODBC driver registry.
    pub odbcinst_path: String,
    /// List drivers through the driver manager; `odbcinst_path` is then only a fallback.
    pub use_driver_manager: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            statement_timeout_secs: 0,
            odbc_batch_size: 64,
            odbc_max_text_len: 64 * 1024,
            odbc_driver_name: DEFAULT_ODBC_DRIVER.to_string(),
            odbcinst_path: "/etc/odbcinst.ini".to_string(),
            use_driver_manager: true,
        }
    }
}

impl DatabaseConfig {
    /// Returns the connect timeout as a Duration.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Returns the statement timeout, if enabled.
    #[must_use]
    pub const fn statement_timeout(&self) -> Option<Duration> {
        if self.statement_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.statement_timeout_secs))
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Log format (json, pretty).
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}
