use chrono::Duration;
use mv_shared::config::QueueSettings;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::clock::Clock;
use crate::domain::entities::{FormPayload, VerificationRecord, VerificationType};
use crate::errors::{DomainError, DomainResult};
use crate::repositories::KeyValueStore;
use crate::services::encryption::PayloadCipher;
use crate::services::locks::SubjectLocks;

pub const QUEUE_INDEX_KEY: &str = "queue:index";

fn record_key(subject_id: &str) -> String {
    format!("queue:record:{}", subject_id)
}

/// Pending verification records.
///
/// Record operations on one subject are not serialized here; callers hold the
/// subject's lock from `SubjectLocks`. The index is guarded internally, and an
/// indexed subject may lack a record but a stored record is always indexed.
pub struct VerificationQueue {
    store: Arc<dyn KeyValueStore>,
    cipher: Arc<dyn PayloadCipher>,
    clock: Arc<dyn Clock>,
    settings: QueueSettings,
    index_lock: Mutex<()>,
}

impl VerificationQueue {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        cipher: Arc<dyn PayloadCipher>,
        clock: Arc<dyn Clock>,
        settings: QueueSettings,
    ) -> Self {
        Self {
            store,
            cipher,
            clock,
            settings,
            index_lock: Mutex::new(()),
        }
    }

    pub fn settings(&self) -> &QueueSettings {
        &self.settings
    }

    /// Create a fresh record, replacing any existing one for the subject
    pub async fn enqueue(
        &self,
        subject_id: &str,
        verification_type: VerificationType,
        payload: FormPayload,
    ) -> DomainResult<VerificationRecord> {
        let record = VerificationRecord::new(subject_id, verification_type, payload, self.clock.now());
        self.add_to_index(subject_id).await?;
        self.write_record(&record).await?;

        tracing::info!(
            subject_id = subject_id,
            verification_type = %verification_type,
            event = "verification_queued",
            "Verification added to retry queue"
        );
        Ok(record)
    }

    /// Load and decrypt a record; corrupted records are discarded and read as absent
    pub async fn peek(&self, subject_id: &str) -> DomainResult<Option<VerificationRecord>> {
        let blob = match self.store.get(&record_key(subject_id)).await.map_err(DomainError::storage)? {
            Some(blob) => blob,
            None => return Ok(None),
        };

        match self.decode(&blob).await {
            Ok(record) => Ok(Some(record)),
            Err(DomainError::DataCorruption { message }) => {
                tracing::warn!(
                    subject_id = subject_id,
                    reason = %message,
                    event = "queue_record_corrupted",
                    "Discarding corrupted queue record"
                );
                self.remove(subject_id).await?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn update(&self, subject_id: &str, record: &VerificationRecord) -> DomainResult<()> {
        if record.subject_id != subject_id {
            return Err(DomainError::internal(format!(
                "Record for {} cannot be stored under {}",
                record.subject_id, subject_id
            )));
        }
        self.write_record(record).await
    }

    /// Delete the record and its index entry; returns whether a record existed
    pub async fn remove(&self, subject_id: &str) -> DomainResult<bool> {
        let existed = self
            .store
            .delete(&record_key(subject_id))
            .await
            .map_err(DomainError::storage)?;
        self.remove_from_index(subject_id).await?;
        Ok(existed)
    }

    pub async fn list_pending(&self) -> DomainResult<Vec<String>> {
        self.read_index().await
    }

    pub async fn pending_count(&self) -> DomainResult<usize> {
        Ok(self.read_index().await?.len())
    }

    /// Decrypted records for every indexed subject, each read under its subject lock
    pub async fn pending_details(&self, locks: &SubjectLocks) -> DomainResult<Vec<VerificationRecord>> {
        let mut records = Vec::new();
        for subject_id in self.read_index().await? {
            let _guard = locks.lock(&subject_id).await;
            if let Some(record) = self.peek(&subject_id).await? {
                records.push(record);
            }
        }
        Ok(records)
    }

    pub fn is_ready_for_retry(&self, record: &VerificationRecord) -> bool {
        let interval = Duration::hours(i64::from(self.settings.retry_interval_hours));
        record.is_ready_for_retry(self.clock.now(), interval)
    }

    pub fn has_exceeded_retries(&self, record: &VerificationRecord) -> bool {
        record.has_exceeded_retries(self.settings.max_retries)
    }

    pub async fn increment_retry(&self, subject_id: &str) -> DomainResult<VerificationRecord> {
        let mut record = self.peek(subject_id).await?.ok_or_else(|| DomainError::NotFound {
            resource: format!("pending verification for subject {}", subject_id),
        })?;

        record.record_retry(self.clock.now());
        self.write_record(&record).await?;

        tracing::debug!(
            subject_id = subject_id,
            retry_count = record.retry_count,
            event = "verification_retry_recorded",
            "Retry recorded"
        );
        Ok(record)
    }

    /// Remove every pending record under its subject lock; returns how many were removed.
    ///
    /// An unreadable index is reset to empty. Records it listed stay stored until
    /// cancelled one by one with [`Self::remove`].
    pub async fn cancel_all(&self, locks: &SubjectLocks) -> DomainResult<usize> {
        let subjects = match self.read_index().await {
            Ok(subjects) => subjects,
            Err(DomainError::DataCorruption { message }) => {
                tracing::error!(reason = %message, event = "queue_index_reset", "Resetting unreadable queue index");
                let _guard = self.index_lock.lock().await;
                self.write_index(&[]).await?;
                return Ok(0);
            }
            Err(e) => return Err(e),
        };

        let mut removed = 0;
        for subject_id in subjects {
            let _guard = locks.lock(&subject_id).await;
            if self.remove(&subject_id).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn write_record(&self, record: &VerificationRecord) -> DomainResult<()> {
        let plaintext = serde_json::to_vec(record)
            .map_err(|e| DomainError::internal(format!("Failed to serialize record: {}", e)))?;
        let blob = self.cipher.encrypt(&plaintext).await?;
        self.store
            .set(&record_key(&record.subject_id), &blob)
            .await
            .map_err(DomainError::storage)
    }

    async fn decode(&self, blob: &str) -> DomainResult<VerificationRecord> {
        let plaintext = self.cipher.decrypt(blob).await?;
        serde_json::from_slice(&plaintext).map_err(|e| DomainError::DataCorruption {
            message: format!("Record does not deserialize: {}", e),
        })
    }

    async fn read_index(&self) -> DomainResult<Vec<String>> {
        match self.store.get(QUEUE_INDEX_KEY).await.map_err(DomainError::storage)? {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|e| {
                tracing::error!(error = %e, event = "queue_index_corrupted", "Queue index unreadable");
                DomainError::DataCorruption {
                    message: format!("Queue index does not deserialize: {}", e),
                }
            }),
        }
    }

    async fn write_index(&self, index: &[String]) -> DomainResult<()> {
        let raw = serde_json::to_string(index)
            .map_err(|e| DomainError::internal(format!("Failed to serialize index: {}", e)))?;
        self.store
            .set(QUEUE_INDEX_KEY, &raw)
            .await
            .map_err(DomainError::storage)
    }

    async fn add_to_index(&self, subject_id: &str) -> DomainResult<()> {
        let _guard = self.index_lock.lock().await;
        let mut index = self.read_index().await?;
        if !index.iter().any(|s| s == subject_id) {
            index.push(subject_id.to_string());
            self.write_index(&index).await?;
        }
        Ok(())
    }

    async fn remove_from_index(&self, subject_id: &str) -> DomainResult<()> {
        let _guard = self.index_lock.lock().await;
        let mut index = self.read_index().await?;
        let before = index.len();
        index.retain(|s| s != subject_id);
        if index.len() != before {
            self.write_index(&index).await?;
        }
        Ok(())
    }
}
