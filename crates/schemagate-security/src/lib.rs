//! # SchemaGate Security
//!
//! Sealing of database connection strings into signed, opaque connection
//! hashes, and masking of secrets for logs.

pub mod mask;
pub mod sealing;

pub use mask::*;
pub use sealing::*;
