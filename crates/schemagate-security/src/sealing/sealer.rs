//! Signed connection hashes.
//!
//! A connection hash is `base64(sha256(conn || secret) || base64(conn))`,
//! using the standard alphabet with padding on both layers.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use schemagate_core::{Interface, SchemaGateError, SchemaGateResult};
use serde::Serialize;
use sha2::{Digest, Sha256};
use shaku::Component;
use tracing::debug;

/// Length of the SHA-256 signature prefix.
pub const SIGNATURE_LEN: usize = 32;

/// Sample connection string used by the self test.
pub const SELF_TEST_SAMPLE: &str =
    "host=localhost port=5432 dbname=testdb user=postgres password=test123";

/// Outcome of a seal/unseal round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SealSelfTest {
    /// Sample that was sealed.
    pub original: String,
    /// Token produced for the sample.
    pub token: String,
    /// Value recovered from the token, if any.
    pub decoded: Option<String>,
    /// True when the recovered value equals the sample.
    pub matches: bool,
    /// Length of the configured secret in bytes.
    pub secret_len: usize,
}

/// Interface for sealing connection strings.
pub trait ConnectionSealerInterface: Interface + Send + Sync {
    /// Seals a connection string into a connection hash.
    fn seal(&self, connection_string: &str) -> String;

    /// Recovers the connection string from a connection hash.
    fn unseal(&self, token: &str) -> SchemaGateResult<String>;

    /// Round-trips a fixed sample through seal and unseal.
    fn self_test(&self) -> SealSelfTest;
}

/// Connection sealer keyed by the `HASH_SECRET`.
#[derive(Component, Clone)]
#[shaku(interface = ConnectionSealerInterface)]
pub struct ConnectionSealer {
    secret: String,
}

impl ConnectionSealer {
    /// Creates a sealer with the given secret.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn signature(&self, connection_string: &str) -> [u8; SIGNATURE_LEN] {
        let mut hasher = Sha256::new();
        hasher.update(connection_string.as_bytes());
        hasher.update(self.secret.as_bytes());
        hasher.finalize().into()
    }
}

impl ConnectionSealerInterface for ConnectionSealer {
    fn seal(&self, connection_string: &str) -> String {
        let encoded = STANDARD.encode(connection_string.as_bytes());

        let mut payload = Vec::with_capacity(SIGNATURE_LEN + encoded.len());
        payload.extend_from_slice(&self.signature(connection_string));
        payload.extend_from_slice(encoded.as_bytes());

        STANDARD.encode(payload)
    }

    fn unseal(&self, token: &str) -> SchemaGateResult<String> {
        let decoded = STANDARD.decode(token.trim()).map_err(|e| {
            debug!("Connection hash is not valid base64: {}", e);
            invalid_hash("not valid base64")
        })?;

        if decoded.len() < SIGNATURE_LEN {
            debug!("Connection hash too short: {} bytes", decoded.len());
            return Err(invalid_hash("too short"));
        }

        let (signature, encoded) = decoded.split_at(SIGNATURE_LEN);
        let connection_string = STANDARD
            .decode(encoded)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .ok_or_else(|| {
                debug!("Connection hash payload is not a base64 UTF-8 string");
                invalid_hash("malformed payload")
            })?;

        if !constant_time_eq(signature, &self.signature(&connection_string)) {
            debug!("Connection hash signature mismatch");
            return Err(invalid_hash("signature mismatch"));
        }

        Ok(connection_string)
    }

    fn self_test(&self) -> SealSelfTest {
        let token = self.seal(SELF_TEST_SAMPLE);
        let decoded = self.unseal(&token).ok();
        let matches = decoded.as_deref() == Some(SELF_TEST_SAMPLE);

        SealSelfTest {
            original: SELF_TEST_SAMPLE.to_string(),
            token,
            decoded,
            matches,
            secret_len: self.secret.len(),
        }
    }
}

impl std::fmt::Debug for ConnectionSealer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSealer").finish_non_exhaustive()
    }
}

fn invalid_hash(reason: &str) -> SchemaGateError {
    SchemaGateError::InvalidHash(reason.to_string())
}

/// Compares two byte slices without short-circuiting on the first difference.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
