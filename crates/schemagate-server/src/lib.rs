//! # SchemaGate Server Library
//!
//! Dependency injection wiring and server startup for the SchemaGate
//! HTTP gateway.

pub mod app;
pub mod di;
pub mod startup;
