//! Key resolution for payload encryption

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use mv_shared::config::EncryptionConfig;
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::aead::{self, KEY_LEN};
use crate::errors::{DomainError, DomainResult};
use crate::repositories::KeyValueStore;

/// Durable store entry holding the wrapped data key
pub const STORED_KEY_NAME: &str = "settings:encryption_key";

/// Which link of the resolution chain supplied the active key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Injected,
    Stored,
    Generated,
}

impl KeySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeySource::Injected => "injected",
            KeySource::Stored => "stored",
            KeySource::Generated => "generated",
        }
    }
}

struct ResolvedKey {
    key: [u8; KEY_LEN],
    source: KeySource,
}

/// Resolves the data key once per process and caches it
pub struct KeyManager {
    store: Arc<dyn KeyValueStore>,
    config: EncryptionConfig,
    resolved: OnceCell<ResolvedKey>,
}

impl KeyManager {
    pub fn new(store: Arc<dyn KeyValueStore>, config: EncryptionConfig) -> Self {
        Self {
            store,
            config,
            resolved: OnceCell::new(),
        }
    }

    /// Generate a new 256-bit key
    pub fn generate_key() -> [u8; KEY_LEN] {
        let mut key = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        key
    }

    pub(crate) async fn key(&self) -> DomainResult<&[u8; KEY_LEN]> {
        let resolved = self.resolved.get_or_try_init(|| self.resolve()).await?;
        Ok(&resolved.key)
    }

    pub async fn key_source(&self) -> DomainResult<KeySource> {
        let resolved = self.resolved.get_or_try_init(|| self.resolve()).await?;
        Ok(resolved.source)
    }

    async fn resolve(&self) -> DomainResult<ResolvedKey> {
        if let Some(secret) = self.config.injected_key() {
            tracing::debug!(event = "encryption_key_resolved", source = "injected", "Using injected encryption key");
            return Ok(ResolvedKey {
                key: Self::derive_injected_key(secret),
                source: KeySource::Injected,
            });
        }

        let stored = self
            .store
            .get(STORED_KEY_NAME)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to read stored encryption key: {}", e)))?;

        if let Some(wrapped) = stored.filter(|w| !w.is_empty()) {
            let key = self.unwrap_key(&wrapped)?;
            tracing::debug!(event = "encryption_key_resolved", source = "stored", "Using stored encryption key");
            return Ok(ResolvedKey {
                key,
                source: KeySource::Stored,
            });
        }

        let key = Self::generate_key();
        let wrapped = self.wrap_key(&key)?;
        self.store
            .set(STORED_KEY_NAME, &wrapped)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to persist encryption key: {}", e)))?;

        tracing::info!(event = "encryption_key_generated", "Generated and stored a new encryption key");
        Ok(ResolvedKey {
            key,
            source: KeySource::Generated,
        })
    }

    /// 64 hex characters are used as-is; anything else is hashed to 32 bytes
    fn derive_injected_key(secret: &str) -> [u8; KEY_LEN] {
        if secret.len() == KEY_LEN * 2 {
            if let Ok(bytes) = hex::decode(secret) {
                if let Ok(key) = <[u8; KEY_LEN]>::try_from(bytes.as_slice()) {
                    return key;
                }
            }
        }
        Sha256::digest(secret.as_bytes()).into()
    }

    fn wrapping_key(&self) -> DomainResult<[u8; KEY_LEN]> {
        let secret = self.config.host_secret.trim();
        if secret.is_empty() {
            return Err(DomainError::configuration(
                "encryption.host_secret is required to store an encryption key",
            ));
        }
        Ok(Sha256::digest(secret.as_bytes()).into())
    }

    fn wrap_key(&self, key: &[u8; KEY_LEN]) -> DomainResult<String> {
        let sealed = aead::seal(&self.wrapping_key()?, key)?;
        Ok(BASE64.encode(sealed))
    }

    fn unwrap_key(&self, wrapped: &str) -> DomainResult<[u8; KEY_LEN]> {
        let sealed = BASE64.decode(wrapped.trim()).map_err(|_| {
            DomainError::configuration("Stored encryption key is not valid base64")
        })?;

        // A wrong host secret looks exactly like tampering; either way we refuse to continue.
        let raw = aead::open(&self.wrapping_key()?, &sealed).map_err(|_| {
            DomainError::configuration("Stored encryption key cannot be unwrapped with the configured host secret")
        })?;

        <[u8; KEY_LEN]>::try_from(raw.as_slice())
            .map_err(|_| DomainError::configuration("Stored encryption key has the wrong length"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryKeyValueStore;

    fn config(key: Option<&str>, host_secret: &str) -> EncryptionConfig {
        EncryptionConfig {
            key: key.map(str::to_string),
            host_secret: host_secret.to_string(),
        }
    }

    #[tokio::test]
    async fn test_injected_key_wins_and_is_not_persisted() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let manager = KeyManager::new(store.clone(), config(Some("passphrase"), "salt"));

        assert_eq!(manager.key_source().await.unwrap(), KeySource::Injected);
        let expected: [u8; KEY_LEN] = Sha256::digest(b"passphrase").into();
        assert_eq!(manager.key().await.unwrap(), &expected);
        assert_eq!(store.get(STORED_KEY_NAME).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_hex_injected_key_is_decoded() {
        let hex_key = "00".repeat(31) + "ff";
        let manager = KeyManager::new(
            Arc::new(InMemoryKeyValueStore::new()),
            config(Some(&hex_key), ""),
        );
        let key = manager.key().await.unwrap();
        assert_eq!(key[31], 0xff);
        assert_eq!(key[0], 0x00);
    }

    #[tokio::test]
    async fn test_generated_key_is_wrapped_and_reused() {
        let store = Arc::new(InMemoryKeyValueStore::new());

        let first = KeyManager::new(store.clone(), config(None, "host-secret"));
        assert_eq!(first.key_source().await.unwrap(), KeySource::Generated);
        let generated = *first.key().await.unwrap();

        let wrapped = store.get(STORED_KEY_NAME).await.unwrap().unwrap();
        assert!(!wrapped.contains(&hex::encode(generated)));

        let second = KeyManager::new(store.clone(), config(None, "host-secret"));
        assert_eq!(second.key_source().await.unwrap(), KeySource::Stored);
        assert_eq!(second.key().await.unwrap(), &generated);
    }

    #[tokio::test]
    async fn test_changed_host_secret_fails_closed() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        KeyManager::new(store.clone(), config(None, "original"))
            .key()
            .await
            .unwrap();

        let manager = KeyManager::new(store, config(None, "rotated"));
        assert!(matches!(
            manager.key().await,
            Err(DomainError::Configuration { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_host_secret_cannot_generate() {
        let manager = KeyManager::new(Arc::new(InMemoryKeyValueStore::new()), config(None, ""));
        assert!(matches!(
            manager.key().await,
            Err(DomainError::Configuration { .. })
        ));
    }

    #[tokio::test]
    async fn test_store_failure_is_not_memoized() {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let manager = KeyManager::new(store.clone(), config(None, "secret"));

        store.set_should_fail(true);
        assert!(manager.key().await.is_err());

        store.set_should_fail(false);
        assert_eq!(manager.key_source().await.unwrap(), KeySource::Generated);
    }
}
