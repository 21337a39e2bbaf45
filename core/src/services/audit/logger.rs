//! Newest-first, bounded audit log persisted as one list in the durable store.
//!
//! Request and response bodies pass through [`redact`] before they are stored, so
//! birth dates, address lines and national IDs never reach persistence.

use chrono::Duration;
use mv_shared::config::AuditSettings;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::clock::Clock;
use crate::domain::entities::{AuditLogEntry, AuditResponse, AuditStatus};
use crate::errors::{DomainError, DomainResult};
use crate::repositories::KeyValueStore;

pub const AUDIT_LOG_KEY: &str = "audit:log";

pub const REDACTED: &str = "[REDACTED]";

pub const REDACTED_FIELDS: &[&str] = &["birthDate", "ssn", "streetAddressLine1", "streetAddressLine2"];

/// Replace the value of every sensitive key, at any depth
pub fn redact(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(map) => JsonValue::Object(
            map.iter()
                .map(|(key, value)| {
                    if REDACTED_FIELDS.contains(&key.as_str()) {
                        (key.clone(), JsonValue::String(REDACTED.to_string()))
                    } else {
                        (key.clone(), redact(value))
                    }
                })
                .collect(),
        ),
        JsonValue::Array(items) => JsonValue::Array(items.iter().map(redact).collect()),
        other => other.clone(),
    }
}

pub struct AuditLogger {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    settings: AuditSettings,
    write_lock: Mutex<()>,
}

impl AuditLogger {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, settings: AuditSettings) -> Self {
        Self {
            store,
            clock,
            settings,
            write_lock: Mutex::new(()),
        }
    }

    /// Record one exchange; the oldest entries beyond the cap are dropped
    pub async fn log(
        &self,
        subject_id: &str,
        request: &JsonValue,
        response: AuditResponse,
    ) -> DomainResult<AuditLogEntry> {
        let response = match response {
            AuditResponse::Http { code, body } => AuditResponse::Http {
                code,
                body: redact(&body),
            },
            other => other,
        };
        let entry = AuditLogEntry::new(subject_id, redact(request), response, self.clock.now());

        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_entries().await?;
        entries.insert(0, entry.clone());
        entries.truncate(self.settings.max_entries);
        self.write_entries(&entries).await?;

        Ok(entry)
    }

    pub async fn get_logs(&self, limit: usize) -> DomainResult<Vec<AuditLogEntry>> {
        let mut entries = self.read_entries().await?;
        entries.truncate(limit);
        Ok(entries)
    }

    pub async fn logs_by_status(&self, status: AuditStatus, limit: usize) -> DomainResult<Vec<AuditLogEntry>> {
        Ok(self
            .read_entries()
            .await?
            .into_iter()
            .filter(|e| e.status == status)
            .take(limit)
            .collect())
    }

    pub async fn logs_for_subject(&self, subject_id: &str, limit: usize) -> DomainResult<Vec<AuditLogEntry>> {
        Ok(self
            .read_entries()
            .await?
            .into_iter()
            .filter(|e| e.subject_id == subject_id)
            .take(limit)
            .collect())
    }

    pub async fn log_count(&self) -> DomainResult<usize> {
        Ok(self.read_entries().await?.len())
    }

    pub async fn clear(&self) -> DomainResult<()> {
        let _guard = self.write_lock.lock().await;
        self.store
            .delete(AUDIT_LOG_KEY)
            .await
            .map_err(DomainError::storage)?;
        tracing::info!(event = "audit_log_cleared", "Audit log cleared");
        Ok(())
    }

    /// Pretty-printed JSON of every entry
    pub async fn export_json(&self) -> DomainResult<String> {
        let entries = self.read_entries().await?;
        serde_json::to_string_pretty(&entries)
            .map_err(|e| DomainError::internal(format!("Failed to export audit log: {}", e)))
    }

    /// Drop entries older than the retention window; returns how many were removed
    pub async fn prune_expired(&self) -> DomainResult<usize> {
        if self.settings.retention_days == 0 {
            return Ok(0);
        }
        let cutoff = self.clock.now() - Duration::days(i64::from(self.settings.retention_days));

        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_entries().await?;
        let before = entries.len();
        entries.retain(|e| e.timestamp >= cutoff);
        let removed = before - entries.len();

        if removed > 0 {
            self.write_entries(&entries).await?;
            tracing::info!(removed = removed, event = "audit_log_pruned", "Pruned expired audit entries");
        }
        Ok(removed)
    }

    async fn read_entries(&self) -> DomainResult<Vec<AuditLogEntry>> {
        match self.store.get(AUDIT_LOG_KEY).await.map_err(DomainError::storage)? {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).or_else(|e| {
                tracing::error!(error = %e, event = "audit_log_corrupted", "Audit log unreadable, starting empty");
                Ok(Vec::new())
            }),
        }
    }

    async fn write_entries(&self, entries: &[AuditLogEntry]) -> DomainResult<()> {
        let raw = serde_json::to_string(entries)
            .map_err(|e| DomainError::internal(format!("Failed to serialize audit log: {}", e)))?;
        self.store
            .set(AUDIT_LOG_KEY, &raw)
            .await
            .map_err(DomainError::storage)
    }
}
