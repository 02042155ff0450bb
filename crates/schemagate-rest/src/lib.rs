//! # SchemaGate REST
//!
//! REST API layer using Axum for SchemaGate.
//! Provides the query, DDL, direct-connection, connection-hash and
//! health endpoints.

pub mod controllers;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod responses;
pub mod router;
pub mod state;

pub use router::*;
pub use state::*;
