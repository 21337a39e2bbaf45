//! Payload encryption for pending verification records
//!
//! Blobs are AES-256-GCM sealed with a key resolved once per process from, in order:
//! an injected secret, a wrapped key persisted in the durable store, or a freshly
//! generated key that is wrapped and persisted.

mod aead;
pub mod key_manager;
pub mod payload_cipher;

pub use key_manager::{KeyManager, KeySource, STORED_KEY_NAME};
pub use payload_cipher::{
    build_payload_cipher, AesGcmPayloadCipher, PayloadCipher, PlaintextPayloadCipher,
};
