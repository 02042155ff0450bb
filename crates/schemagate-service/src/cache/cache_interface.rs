//! Cache interface trait for abstracted caching operations.

use async_trait::async_trait;
use schemagate_core::SchemaGateResult;
use shaku::Interface;
use std::time::Duration;

/// Cache interface for storing and retrieving cached payloads.
///
/// Values are stored as JSON strings so the trait stays dyn-compatible.
#[async_trait]
pub trait CacheInterface: Interface + Send + Sync {
    /// Get a raw JSON value from the cache.
    ///
    /// Returns `None` if the key doesn't exist or has expired.
    async fn get_raw(&self, key: &str) -> SchemaGateResult<Option<String>>;

    /// Set a raw JSON value in the cache with a TTL.
    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> SchemaGateResult<()>;

    /// Delete a value from the cache.
    ///
    /// Returns `true` if the key existed and was deleted.
    async fn delete(&self, key: &str) -> SchemaGateResult<bool>;

    /// Round-trips a PING to the backend.
    async fn ping(&self) -> SchemaGateResult<()>;

    /// Check if caching is enabled.
    fn is_enabled(&self) -> bool;
}

/// Typed helpers over [`CacheInterface`].
#[async_trait]
pub trait CacheExt: CacheInterface {
    /// Get a typed value from the cache.
    async fn get<T: serde::de::DeserializeOwned + Send>(&self, key: &str) -> SchemaGateResult<Option<T>> {
        match self.get_raw(key).await? {
            Some(json) => {
                let value: T = serde_json::from_str(&json)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Set a typed value in the cache.
    async fn set<T: serde::Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> SchemaGateResult<()> {
        let json = serde_json::to_string(value)?;
        self.set_raw(key, &json, ttl).await
    }
}

impl<T: CacheInterface + ?Sized> CacheExt for T {}
