//! Connection-hash service trait definition.

use crate::dto::{HashEncryptResponse, HashTestResponse, HashVerifyResponse};
use async_trait::async_trait;
use schemagate_core::{Interface, SchemaGateResult};

/// Seals and opens connection hashes.
#[async_trait]
pub trait HashService: Interface + Send + Sync {
    /// Seals a connection string and checks the result unseals.
    async fn encrypt(&self, connection_string: &str) -> SchemaGateResult<HashEncryptResponse>;

    /// Opens a connection hash.
    async fn verify(&self, hash: &str) -> SchemaGateResult<HashVerifyResponse>;

    /// Round-trips a sample connection string.
    async fn self_test(&self) -> HashTestResponse;

    /// Returns the connection string inside a hash.
    fn resolve(&self, hash: &str) -> SchemaGateResult<String>;
}
