//! Service implementations.

mod db_service_impl;
mod hash_service_impl;

pub use db_service_impl::DbServiceComponent;
pub use hash_service_impl::HashServiceComponent;
