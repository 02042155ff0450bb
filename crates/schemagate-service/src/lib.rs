//! # SchemaGate Service
//!
//! Application services: query execution and DDL extraction with
//! transparent Redis caching, and connection-hash operations.

pub mod cache;
pub mod db_service;
pub mod dto;
pub mod hash_service;
pub mod r#impl;

pub use cache::*;
pub use db_service::*;
pub use dto::*;
pub use hash_service::*;
pub use r#impl::*;
