//! Configuration validation module.
//!
//! Collects every problem in one pass so startup fails with the full list.

use crate::AppConfig;
use std::fmt;

/// Configuration validation error variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// Port number is invalid (must be 1-65535).
    InvalidPort { name: String, value: u16 },
    /// Worker count must be at least one.
    InvalidWorkers { value: usize },
    /// A required string value is empty.
    EmptyValue { name: String },
    /// Timeout value must be positive.
    NonPositiveTimeout { name: String, value: u64 },
    /// Log level is invalid.
    InvalidLogLevel { value: String },
    /// Batch or buffer size must be positive.
    NonPositiveSize { name: String },
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPort { name, value } => {
                write!(f, "Invalid port for {}: {} (must be 1-65535)", name, value)
            }
            Self::InvalidWorkers { value } => {
                write!(f, "Invalid worker count: {} (must be at least 1)", value)
            }
            Self::EmptyValue { name } => write!(f, "'{}' cannot be empty", name),
            Self::NonPositiveTimeout { name, value } => {
                write!(f, "Timeout '{}' must be positive, got {}", name, value)
            }
            Self::InvalidLogLevel { value } => {
                write!(
                    f,
                    "Invalid log level: '{}' (valid: trace, debug, info, warn, error)",
                    value
                )
            }
            Self::NonPositiveSize { name } => write!(f, "'{}' must be positive", name),
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Valid log levels.
    const VALID_LOG_LEVELS: &'static [&'static str] = &["trace", "debug", "info", "warn", "error"];

    /// Validates the entire application configuration.
    ///
    /// Returns Ok(()) if valid, or Err with all validation errors found.
    pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        Self::validate_server(config, &mut errors);
        Self::validate_redis(config, &mut errors);
        Self::validate_security(config, &mut errors);
        Self::validate_database(config, &mut errors);
        Self::validate_observability(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_server(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        let server = &config.server;
        if server.port == 0 {
            errors.push(ConfigValidationError::InvalidPort {
                name: "server.port".to_string(),
                value: server.port,
            });
        }
        if server.workers == 0 {
            errors.push(ConfigValidationError::InvalidWorkers { value: 0 });
        }
        if server.host.trim().is_empty() {
            errors.push(ConfigValidationError::EmptyValue {
                name: "server.host".to_string(),
            });
        }
        if server.request_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "server.request_timeout_secs".to_string(),
                value: 0,
            });
        }
    }

    fn validate_redis(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        let redis = &config.redis;
        if !redis.enabled {
            return;
        }
        if redis.host.trim().is_empty() {
            errors.push(ConfigValidationError::EmptyValue {
                name: "redis.host".to_string(),
            });
        }
        if redis.port == 0 {
            errors.push(ConfigValidationError::InvalidPort {
                name: "redis.port".to_string(),
                value: 0,
            });
        }
        if redis.pool_size == 0 {
            errors.push(ConfigValidationError::NonPositiveSize {
                name: "redis.pool_size".to_string(),
            });
        }
    }

    fn validate_security(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.security.hash_secret.is_empty() {
            errors.push(ConfigValidationError::EmptyValue {
                name: "security.hash_secret".to_string(),
            });
        }
    }

    fn validate_database(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        let database = &config.database;
        if database.connect_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "database.connect_timeout_secs".to_string(),
                value: 0,
            });
        }
        if database.odbc_batch_size == 0 {
            errors.push(ConfigValidationError::NonPositiveSize {
                name: "database.odbc_batch_size".to_string(),
            });
        }
        if database.odbc_max_text_len == 0 {
            errors.push(ConfigValidationError::NonPositiveSize {
                name: "database.odbc_max_text_len".to_string(),
            });
        }
    }

    fn validate_observability(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        let level = config.observability.log_level.to_lowercase();
        if !Self::VALID_LOG_LEVELS.contains(&level.as_str()) {
            errors.push(ConfigValidationError::InvalidLogLevel {
                value: config.observability.log_level.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ConfigValidator::validate(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        config.server.workers = 0;
        config.observability.log_level = "verbose".to_string();

        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ConfigValidationError::InvalidWorkers { value: 0 }));
        assert!(errors.contains(&ConfigValidationError::InvalidLogLevel {
            value: "verbose".to_string()
        }));
    }

    #[test]
    fn test_disabled_redis_skips_checks() {
        let mut config = AppConfig::default();
        config.redis.enabled = false;
        config.redis.host = String::new();
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_empty_hash_secret_rejected() {
        let mut config = AppConfig::default();
        config.security.hash_secret = String::new();
        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(
            errors[0].to_string(),
            "'security.hash_secret' cannot be empty"
        );
    }
}
