//! Key material for payload encryption

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EncryptionConfig {
    /// Externally injected key: 64 hex characters, or a passphrase hashed to 32 bytes.
    /// Takes precedence over any stored key.
    #[serde(default)]
    pub key: Option<String>,

    /// Stable host secret; its SHA-256 digest wraps the stored key
    #[serde(default)]
    pub host_secret: String,
}

impl EncryptionConfig {
    pub fn injected_key(&self) -> Option<&str> {
        self.key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }
}
