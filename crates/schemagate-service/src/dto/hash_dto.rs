//! Connection-hash DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request to seal a connection string.
#[derive(Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct HashEncryptRequest {
    #[schema(example = "host=localhost port=5432 dbname=testdb user=postgres password=postgres")]
    pub connection_string: Option<String>,
}

impl std::fmt::Debug for HashEncryptRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashEncryptRequest").finish_non_exhaustive()
    }
}

/// Request to open a connection hash.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct HashVerifyRequest {
    pub hash: Option<String>,
}

/// Sealed connection string.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HashEncryptResponse {
    pub status: String,
    pub hash: String,
    /// Whether the fresh hash unsealed back to the input.
    pub test_verification: bool,
    pub hash_length: usize,
}

/// Unsealed connection string.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HashVerifyResponse {
    pub status: String,
    pub connection_string: String,
    pub hash_length: usize,
}

/// Result of the built-in seal/unseal round trip.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HashTestResponse {
    pub status: String,
    pub hash_system: String,
    pub original: String,
    pub encrypted_hash: String,
    pub decrypted: Option<String>,
    #[serde(rename = "match")]
    pub matches: bool,
    pub secret_key_length: usize,
}
