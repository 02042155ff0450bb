//! # SchemaGate Config
//!
//! Configuration management for SchemaGate.
//! Supports layered configuration from files, prefixed environment
//! variables and the plain variables injected by the compose file
//! (`REDIS_HOST`, `REDIS_PORT`, `REDIS_PASSWORD`, `HASH_SECRET`, `DEBUG`).

mod app_config;
mod loader;
mod validation;

pub use app_config::*;
pub use loader::*;
pub use validation::*;
