//! REST API controllers.

pub mod direct_controller;
pub mod hash_controller;
pub mod health_controller;
pub mod query_controller;

pub use health_controller::*;
