//! Connection-hash service implementation.

use crate::dto::{HashEncryptResponse, HashTestResponse, HashVerifyResponse};
use crate::hash_service::HashService;
use async_trait::async_trait;
use schemagate_core::SchemaGateResult;
use schemagate_security::ConnectionSealerInterface;
use shaku::Component;
use std::sync::Arc;
use tracing::{debug, warn};

/// Name reported by the self-test endpoint.
const HASH_SYSTEM: &str = "SHA-256 signed Base64";

const SUCCESS: &str = "success";

/// Shaku component wrapping the connection sealer.
#[derive(Component)]
#[shaku(interface = HashService)]
pub struct HashServiceComponent {
    #[shaku(inject)]
    sealer: Arc<dyn ConnectionSealerInterface>,
}

impl std::fmt::Debug for HashServiceComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashServiceComponent").finish_non_exhaustive()
    }
}

impl HashServiceComponent {
    /// Creates a hash service over an explicit sealer.
    pub fn new(sealer: Arc<dyn ConnectionSealerInterface>) -> Self {
        Self { sealer }
    }
}

#[async_trait]
impl HashService for HashServiceComponent {
    async fn encrypt(&self, connection_string: &str) -> SchemaGateResult<HashEncryptResponse> {
        let hash = self.sealer.seal(connection_string);
        let test_verification = self.sealer.unseal(&hash).is_ok();
        if !test_verification {
            warn!("Freshly sealed connection hash failed to unseal");
        }

        debug!("Sealed connection string into {} byte hash", hash.len());
        Ok(HashEncryptResponse {
            status: SUCCESS.to_string(),
            hash_length: hash.len(),
            hash,
            test_verification,
        })
    }

    async fn verify(&self, hash: &str) -> SchemaGateResult<HashVerifyResponse> {
        let connection_string = self.sealer.unseal(hash)?;
        Ok(HashVerifyResponse {
            status: SUCCESS.to_string(),
            connection_string,
            hash_length: hash.len(),
        })
    }

    async fn self_test(&self) -> HashTestResponse {
        let report = self.sealer.self_test();
        HashTestResponse {
            status: if report.matches { SUCCESS } else { "error" }.to_string(),
            hash_system: HASH_SYSTEM.to_string(),
            original: report.original,
            encrypted_hash: report.token,
            decrypted: report.decoded,
            matches: report.matches,
            secret_key_length: report.secret_len,
        }
    }

    fn resolve(&self, hash: &str) -> SchemaGateResult<String> {
        self.sealer.unseal(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemagate_core::SchemaGateError;
    use schemagate_security::ConnectionSealer;

    fn service(secret: &str) -> HashServiceComponent {
        HashServiceComponent::new(Arc::new(ConnectionSealer::new(secret)))
    }

    #[tokio::test]
    async fn test_encrypt_then_verify() {
        let service = service("s3cret");
        let conn = "host=db port=5432 dbname=app user=u password=p";

        let sealed = service.encrypt(conn).await.unwrap();
        assert_eq!(sealed.status, "success");
        assert!(sealed.test_verification);
        assert_eq!(sealed.hash_length, sealed.hash.len());

        let opened = service.verify(&sealed.hash).await.unwrap();
        assert_eq!(opened.connection_string, conn);
        assert_eq!(opened.hash_length, sealed.hash.len());
        assert_eq!(service.resolve(&sealed.hash).unwrap(), conn);
    }

    #[tokio::test]
    async fn test_verify_rejects_foreign_hash() {
        let hash = service("one").encrypt("host=db").await.unwrap().hash;
        let err = service("two").verify(&hash).await.unwrap_err();
        assert!(matches!(err, SchemaGateError::InvalidHash(_)));
    }

    #[tokio::test]
    async fn test_self_test_report() {
        let report = service("0123456789").self_test().await;
        assert_eq!(report.status, "success");
        assert!(report.matches);
        assert_eq!(report.secret_key_length, 10);
        assert_eq!(report.decrypted.as_deref(), Some(report.original.as_str()));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["match"], true);
    }
}
