//! Application state for Axum handlers.

use schemagate_core::HealthCheck;
use schemagate_service::{DbService, HashService};
use shaku::{HasComponent, Module};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db_service: Arc<dyn DbService>,
    pub hash_service: Arc<dyn HashService>,
    /// Checks run by the readiness endpoint.
    pub health_checks: Arc<[Arc<dyn HealthCheck>]>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        db_service: Arc<dyn DbService>,
        hash_service: Arc<dyn HashService>,
        health_checks: Vec<Arc<dyn HealthCheck>>,
    ) -> Self {
        Self {
            db_service,
            hash_service,
            health_checks: health_checks.into(),
        }
    }

    /// Resolves the services from a Shaku module.
    pub fn from_module<M>(module: &M, health_checks: Vec<Arc<dyn HealthCheck>>) -> Self
    where
        M: Module + HasComponent<dyn DbService> + HasComponent<dyn HashService>,
    {
        let db_service: Arc<dyn DbService> = module.resolve();
        let hash_service: Arc<dyn HashService> = module.resolve();
        Self::new(db_service, hash_service, health_checks)
    }
}
