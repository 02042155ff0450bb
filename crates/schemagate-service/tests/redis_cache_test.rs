//! Redis cache integration tests against a real server.
//!
//! Run with `cargo test -- --ignored` on a machine with Docker.

use schemagate_core::HealthCheck;
use schemagate_service::{CacheHealthCheck, CacheInterface, RedisCacheService};
use std::sync::Arc;
use std::time::Duration;
use testcontainers::{runners::AsyncRunner, ContainerAsync, ImageExt};
use testcontainers_modules::redis::Redis;

async fn start_redis() -> (ContainerAsync<Redis>, Arc<deadpool_redis::Pool>) {
    let container = Redis::default()
        .with_tag("7-alpine")
        .start()
        .await
        .expect("Failed to start Redis container");
    let port = container
        .get_host_port_ipv4(6379)
        .await
        .expect("Failed to get Redis port");

    let pool = deadpool_redis::Config::from_url(format!("redis://127.0.0.1:{}/0", port))
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .expect("Failed to create Redis pool");

    (container, Arc::new(pool))
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_set_get_delete() {
    let (_container, pool) = start_redis().await;
    let cache = RedisCacheService::new(pool);

    cache.ping().await.unwrap();
    assert_eq!(cache.get_raw("db_api:test").await.unwrap(), None);

    cache
        .set_raw("db_api:test", r#"{"status":"success"}"#, Duration::from_secs(30))
        .await
        .unwrap();
    assert_eq!(
        cache.get_raw("db_api:test").await.unwrap().as_deref(),
        Some(r#"{"status":"success"}"#)
    );

    assert!(cache.delete("db_api:test").await.unwrap());
    assert!(!cache.delete("db_api:test").await.unwrap());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_entries_expire() {
    let (_container, pool) = start_redis().await;
    let cache = RedisCacheService::new(pool);

    cache.set_raw("db_api:short", "{}", Duration::from_secs(1)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(2100)).await;
    assert_eq!(cache.get_raw("db_api:short").await.unwrap(), None);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_health_check_against_live_server() {
    let (_container, pool) = start_redis().await;
    let check = CacheHealthCheck::new(Arc::new(RedisCacheService::new(pool)));
    assert!(check.check().await.is_healthy());
}
