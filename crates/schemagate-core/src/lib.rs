//! # SchemaGate Core
//!
//! Core types, traits, and error definitions for SchemaGate.
//! Every other crate in the workspace builds on the error type and
//! result alias defined here.

pub mod error;
pub mod logging;
pub mod result;
pub mod traits;
pub mod validation;

pub use error::*;
pub use result::*;
pub use traits::*;
pub use validation::*;

// Re-export shaku for dependency injection
pub use shaku::Interface;
