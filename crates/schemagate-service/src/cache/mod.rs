//! Caching infrastructure for the service layer.
//!
//! Query and DDL payloads are cached in Redis under hashed keys.

mod cache_interface;
pub mod cache_keys;
mod health;
mod redis_cache;

pub use cache_interface::{CacheExt, CacheInterface};
pub use health::CacheHealthCheck;
pub use redis_cache::{RedisCacheService, RedisCacheServiceParameters, DEFAULT_TTL};
