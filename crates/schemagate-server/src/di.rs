//! Dependency injection module using Shaku.

use deadpool_redis::{Pool, PoolConfig, Runtime};
use schemagate_config::{AppConfig, RedisConfig};
use schemagate_connector::{
    ConnectorFactory, ConnectorOptions, DriverLookup, OdbcDriverCheck, SqlConnectorFactory,
    SqlConnectorFactoryParameters,
};
use schemagate_core::{HealthCheck, SchemaGateError, SchemaGateResult};
use schemagate_security::{ConnectionSealer, ConnectionSealerInterface, ConnectionSealerParameters};
use schemagate_service::{
    CacheHealthCheck, CacheInterface, DbService, DbServiceComponent, HashService,
    HashServiceComponent, RedisCacheService, RedisCacheServiceParameters, DEFAULT_TTL,
};
use shaku::{module, HasComponent};
use std::sync::Arc;
use tracing::info;

// Single-process module holding every component:
// - connection hash sealing
// - database connectors
// - Redis caching
// - query/DDL and hash services
module! {
    pub AppModule {
        components = [
            ConnectionSealer,
            SqlConnectorFactory,
            RedisCacheService,
            DbServiceComponent,
            HashServiceComponent,
        ],
        providers = [],
    }
}

/// Creates the Redis pool, or `None` when caching is disabled.
///
/// The pool connects lazily, so an unreachable server is not an error here.
pub fn create_redis_pool(config: &RedisConfig) -> SchemaGateResult<Option<Arc<Pool>>> {
    if !config.enabled {
        info!("Redis caching disabled");
        return Ok(None);
    }

    let mut redis_cfg = deadpool_redis::Config::from_url(config.url());
    redis_cfg.pool = Some(PoolConfig::new(config.pool_size.max(1)));

    let pool = redis_cfg
        .create_pool(Some(Runtime::Tokio1))
        .map_err(|e| SchemaGateError::Cache(format!("Failed to create Redis pool: {}", e)))?;

    info!("Redis pool created for {}", config.redacted_url());
    Ok(Some(Arc::new(pool)))
}

/// Builds the application module from configuration.
pub fn build_app_module(config: &AppConfig) -> SchemaGateResult<Arc<AppModule>> {
    let cache_pool = create_redis_pool(&config.redis)?;

    let module = AppModule::builder()
        .with_component_parameters::<ConnectionSealer>(ConnectionSealerParameters {
            secret: config.security.hash_secret.clone(),
        })
        .with_component_parameters::<SqlConnectorFactory>(SqlConnectorFactoryParameters {
            options: ConnectorOptions::from(&config.database),
        })
        .with_component_parameters::<RedisCacheService>(RedisCacheServiceParameters {
            pool: cache_pool,
            default_ttl: DEFAULT_TTL,
        })
        .build();

    Ok(Arc::new(module))
}

/// Readiness checks: Redis reachability and ODBC driver registration.
pub fn health_checks(module: &AppModule, config: &AppConfig) -> Vec<Arc<dyn HealthCheck>> {
    vec![
        Arc::new(CacheHealthCheck::new(module.cache())),
        Arc::new(OdbcDriverCheck::new(
            DriverLookup::from(&config.database),
            &config.database.odbc_driver_name,
        )),
    ]
}

/// Resolves the services from the module.
pub trait ServiceResolver {
    /// Resolves the query/DDL service.
    fn db_service(&self) -> Arc<dyn DbService>;

    /// Resolves the connection hash service.
    fn hash_service(&self) -> Arc<dyn HashService>;

    /// Resolves the cache.
    fn cache(&self) -> Arc<dyn CacheInterface>;
}

impl ServiceResolver for AppModule {
    fn db_service(&self) -> Arc<dyn DbService> {
        self.resolve()
    }

    fn hash_service(&self) -> Arc<dyn HashService> {
        self.resolve()
    }

    fn cache(&self) -> Arc<dyn CacheInterface> {
        self.resolve()
    }
}
