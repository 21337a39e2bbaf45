//! Redis implementations of the storage ports

use async_trait::async_trait;
use mv_core::domain::entities::{SubjectContact, VerificationType, VerifiedStatus};
use mv_core::repositories::{EphemeralCache, KeyValueStore, ProfileRepository};

use super::RedisClient;

/// Durable store. Keys never expire.
#[derive(Clone)]
pub struct RedisKeyValueStore {
    client: RedisClient,
}

impl RedisKeyValueStore {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl KeyValueStore for RedisKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, String> {
        self.client.get(key).await.map_err(|e| e.to_string())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), String> {
        self.client.set(key, value).await.map_err(|e| e.to_string())
    }

    async fn delete(&self, key: &str) -> Result<bool, String> {
        self.client.delete(key).await.map_err(|e| e.to_string())
    }
}

/// TTL cache backed by `SETEX`; Redis drops expired entries on its own
#[derive(Clone)]
pub struct RedisEphemeralCache {
    client: RedisClient,
}

impl RedisEphemeralCache {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    fn key(key: &str) -> String {
        format!("ephemeral:{}", key)
    }
}

#[async_trait]
impl EphemeralCache for RedisEphemeralCache {
    async fn set_with_ttl(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), String> {
        self.client
            .set_with_expiry(&Self::key(key), value, ttl_seconds)
            .await
            .map_err(|e| e.to_string())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, String> {
        self.client.get(&Self::key(key)).await.map_err(|e| e.to_string())
    }

    async fn delete(&self, key: &str) -> Result<(), String> {
        self.client
            .delete(&Self::key(key))
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

/// Verified flags and contact details stored as JSON documents.
///
/// A deployment that keeps profiles elsewhere replaces this adapter; the core
/// only sees [`ProfileRepository`].
#[derive(Clone)]
pub struct RedisProfileRepository {
    client: RedisClient,
}

impl RedisProfileRepository {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    pub(crate) fn verified_key(subject_id: &str, verification_type: VerificationType) -> String {
        format!("profile:{}:verified:{}", subject_id, verification_type.as_str())
    }

    pub(crate) fn contact_key(subject_id: &str) -> String {
        format!("profile:{}:contact", subject_id)
    }
}

#[async_trait]
impl ProfileRepository for RedisProfileRepository {
    async fn get_verified(
        &self,
        subject_id: &str,
        verification_type: VerificationType,
    ) -> Result<Option<VerifiedStatus>, String> {
        let raw = self
            .client
            .get(&Self::verified_key(subject_id, verification_type))
            .await
            .map_err(|e| e.to_string())?;

        raw.map(|json| serde_json::from_str(&json).map_err(|e| e.to_string()))
            .transpose()
    }

    async fn set_verified(
        &self,
        subject_id: &str,
        verification_type: VerificationType,
        status: Option<VerifiedStatus>,
    ) -> Result<(), String> {
        let key = Self::verified_key(subject_id, verification_type);
        match status {
            Some(status) => {
                let json = serde_json::to_string(&status).map_err(|e| e.to_string())?;
                self.client.set(&key, &json).await.map_err(|e| e.to_string())
            }
            None => self
                .client
                .delete(&key)
                .await
                .map(|_| ())
                .map_err(|e| e.to_string()),
        }
    }

    async fn get_contact(&self, subject_id: &str) -> Result<Option<SubjectContact>, String> {
        let raw = self
            .client
            .get(&Self::contact_key(subject_id))
            .await
            .map_err(|e| e.to_string())?;

        raw.map(|json| serde_json::from_str(&json).map_err(|e| e.to_string()))
            .transpose()
    }

    async fn set_contact(&self, subject_id: &str, contact: SubjectContact) -> Result<(), String> {
        let json = serde_json::to_string(&contact).map_err(|e| e.to_string())?;
        self.client
            .set(&Self::contact_key(subject_id), &json)
            .await
            .map_err(|e| e.to_string())
    }
}
