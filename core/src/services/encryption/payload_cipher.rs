//! Encryption of serialized verification payloads

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use mv_shared::config::GeneralSettings;
use std::sync::Arc;

use super::aead;
use super::key_manager::KeyManager;
use crate::errors::{DomainError, DomainResult};

const SELF_TEST_PLAINTEXT: &str = "verification payload self-test";

/// Turns plaintext into a self-describing text blob and back
#[async_trait]
pub trait PayloadCipher: Send + Sync {
    async fn encrypt(&self, plaintext: &[u8]) -> DomainResult<String>;

    /// Corrupted or tampered blobs fail with `DomainError::DataCorruption`
    async fn decrypt(&self, blob: &str) -> DomainResult<Vec<u8>>;

    /// Whether this cipher provides confidentiality
    fn is_authenticated(&self) -> bool;

    /// Round-trip a fixed string through the active cipher
    async fn test_encryption(&self) -> bool {
        let blob = match self.encrypt(SELF_TEST_PLAINTEXT.as_bytes()).await {
            Ok(blob) => blob,
            Err(e) => {
                tracing::error!(error = %e, event = "encryption_self_test_failed", "Encryption self-test failed");
                return false;
            }
        };
        match self.decrypt(&blob).await {
            Ok(plaintext) => plaintext == SELF_TEST_PLAINTEXT.as_bytes(),
            Err(e) => {
                tracing::error!(error = %e, event = "encryption_self_test_failed", "Decryption self-test failed");
                false
            }
        }
    }
}

/// AES-256-GCM, base64 of nonce || ciphertext || tag
pub struct AesGcmPayloadCipher {
    keys: Arc<KeyManager>,
}

impl AesGcmPayloadCipher {
    pub fn new(keys: Arc<KeyManager>) -> Self {
        Self { keys }
    }
}

#[async_trait]
impl PayloadCipher for AesGcmPayloadCipher {
    async fn encrypt(&self, plaintext: &[u8]) -> DomainResult<String> {
        let key = self.keys.key().await?;
        let sealed = aead::seal(key, plaintext)?;
        Ok(BASE64.encode(sealed))
    }

    async fn decrypt(&self, blob: &str) -> DomainResult<Vec<u8>> {
        let key = self.keys.key().await?;
        let sealed = BASE64.decode(blob.trim()).map_err(|_| DomainError::DataCorruption {
            message: "Encrypted blob is not valid base64".to_string(),
        })?;
        aead::open(key, &sealed)
    }

    fn is_authenticated(&self) -> bool {
        true
    }
}

/// UNSAFE testing override: plain base64, no confidentiality or integrity
#[derive(Debug, Default)]
pub struct PlaintextPayloadCipher;

#[async_trait]
impl PayloadCipher for PlaintextPayloadCipher {
    async fn encrypt(&self, plaintext: &[u8]) -> DomainResult<String> {
        Ok(BASE64.encode(plaintext))
    }

    async fn decrypt(&self, blob: &str) -> DomainResult<Vec<u8>> {
        BASE64.decode(blob.trim()).map_err(|_| DomainError::DataCorruption {
            message: "Stored blob is not valid base64".to_string(),
        })
    }

    fn is_authenticated(&self) -> bool {
        false
    }
}

/// Pick the cipher for the configured mode
pub fn build_payload_cipher(settings: &GeneralSettings, keys: Arc<KeyManager>) -> Arc<dyn PayloadCipher> {
    if settings.disable_encryption {
        tracing::warn!(
            event = "encryption_disabled",
            "Payload encryption is DISABLED; pending verification data is stored as plain base64"
        );
        Arc::new(PlaintextPayloadCipher)
    } else {
        Arc::new(AesGcmPayloadCipher::new(keys))
    }
}
