//! Redis-based cache implementation.

use super::CacheInterface;
use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Pool};
use schemagate_core::{SchemaGateError, SchemaGateResult};
use shaku::Component;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default TTL for cached payloads (1 hour).
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Redis-based cache service.
#[derive(Component)]
#[shaku(interface = CacheInterface)]
pub struct RedisCacheService {
    /// Redis connection pool; `None` when caching is disabled.
    pool: Option<Arc<Pool>>,
    /// TTL used when a caller passes a zero duration.
    #[shaku(default = DEFAULT_TTL)]
    default_ttl: Duration,
}

impl fmt::Debug for RedisCacheService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCacheService")
            .field("enabled", &self.pool.is_some())
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}

impl RedisCacheService {
    /// Create a new Redis cache service.
    #[must_use]
    pub fn new(pool: Arc<Pool>) -> Self {
        Self {
            pool: Some(pool),
            default_ttl: DEFAULT_TTL,
        }
    }

    /// Create a cache service with a custom default TTL.
    #[must_use]
    pub fn with_ttl(pool: Arc<Pool>, default_ttl: Duration) -> Self {
        Self {
            pool: Some(pool),
            default_ttl,
        }
    }

    /// Create a no-op cache service (for when Redis is disabled).
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            pool: None,
            default_ttl: DEFAULT_TTL,
        }
    }

    async fn get_conn(&self) -> SchemaGateResult<deadpool_redis::Connection> {
        match &self.pool {
            Some(pool) => pool.get().await.map_err(|e| {
                SchemaGateError::Cache(format!("Failed to get Redis connection: {}", e))
            }),
            None => Err(SchemaGateError::Cache("Cache is disabled".to_string())),
        }
    }

    fn effective_ttl(&self, ttl: Duration) -> u64 {
        let ttl = if ttl.is_zero() { self.default_ttl } else { ttl };
        ttl.as_secs().max(1)
    }
}

#[async_trait]
impl CacheInterface for RedisCacheService {
    fn is_enabled(&self) -> bool {
        self.pool.is_some()
    }

    async fn get_raw(&self, key: &str) -> SchemaGateResult<Option<String>> {
        if !self.is_enabled() {
            return Ok(None);
        }

        let mut conn = self.get_conn().await?;
        let value: Option<String> = conn.get(key).await.map_err(|e| {
            SchemaGateError::Cache(format!("Failed to get key '{}': {}", key, e))
        })?;

        match &value {
            Some(_) => debug!("Cache hit for key '{}'", key),
            None => debug!("Cache miss for key '{}'", key),
        }

        Ok(value)
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> SchemaGateResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let mut conn = self.get_conn().await?;
        let ttl_secs = self.effective_ttl(ttl);

        conn.set_ex::<_, _, ()>(key, value, ttl_secs).await.map_err(|e| {
            SchemaGateError::Cache(format!("Failed to set key '{}': {}", key, e))
        })?;

        debug!("Cached key '{}' with TTL {}s", key, ttl_secs);
        Ok(())
    }

    async fn delete(&self, key: &str) -> SchemaGateResult<bool> {
        if !self.is_enabled() {
            return Ok(false);
        }

        let mut conn = self.get_conn().await?;
        let deleted: i64 = conn.del(key).await.map_err(|e| {
            SchemaGateError::Cache(format!("Failed to delete key '{}': {}", key, e))
        })?;

        debug!("Deleted key '{}': {}", key, deleted > 0);
        Ok(deleted > 0)
    }

    async fn ping(&self) -> SchemaGateResult<()> {
        let mut conn = self.get_conn().await?;
        let pong: String = deadpool_redis::redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| SchemaGateError::Cache(format!("Redis ping failed: {}", e)))?;

        if pong == "PONG" {
            Ok(())
        } else {
            Err(SchemaGateError::Cache(format!("Unexpected PING reply: {}", pong)))
        }
    }
}
