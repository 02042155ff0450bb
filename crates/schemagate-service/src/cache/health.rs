//! Readiness check for the Redis cache.

use super::CacheInterface;
use async_trait::async_trait;
use schemagate_core::{HealthCheck, HealthStatus};
use std::sync::Arc;

/// Pings Redis; a disabled cache counts as healthy.
pub struct CacheHealthCheck {
    cache: Arc<dyn CacheInterface>,
}

impl CacheHealthCheck {
    /// Creates a check over the given cache.
    #[must_use]
    pub fn new(cache: Arc<dyn CacheInterface>) -> Self {
        Self { cache }
    }
}

impl std::fmt::Debug for CacheHealthCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheHealthCheck")
            .field("enabled", &self.cache.is_enabled())
            .finish()
    }
}

#[async_trait]
impl HealthCheck for CacheHealthCheck {
    fn name(&self) -> &str {
        "redis"
    }

    async fn check(&self) -> HealthStatus {
        if !self.cache.is_enabled() {
            return HealthStatus::Healthy;
        }
        match self.cache.ping().await {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RedisCacheService;

    #[tokio::test]
    async fn test_disabled_cache_is_healthy() {
        let check = CacheHealthCheck::new(Arc::new(RedisCacheService::disabled()));
        assert_eq!(check.name(), "redis");
        assert!(check.check().await.is_healthy());
    }
}
