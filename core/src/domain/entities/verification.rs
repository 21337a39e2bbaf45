//! Pending verification record kept in the retry queue.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Verification-form field name to value
pub type FormPayload = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VerificationType {
    Veteran,
    Military,
}

impl VerificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Veteran => "veteran",
            Self::Military => "military",
        }
    }

    /// Human label used in notifications
    pub fn label(&self) -> &'static str {
        match self {
            Self::Veteran => "Veteran",
            Self::Military => "Military",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "veteran" => Some(Self::Veteran),
            "military" => Some(Self::Military),
            _ => None,
        }
    }
}

impl std::fmt::Display for VerificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal outcomes remove the record, so only one status exists
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    #[default]
    Pending,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerificationRecord {
    pub subject_id: String,
    #[serde(rename = "type")]
    pub verification_type: VerificationType,
    pub payload: FormPayload,
    pub created_at: DateTime<Utc>,
    pub retry_count: u32,
    pub last_retry_at: Option<DateTime<Utc>>,
    pub status: RecordStatus,
}

impl VerificationRecord {
    pub fn new(
        subject_id: impl Into<String>,
        verification_type: VerificationType,
        payload: FormPayload,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            verification_type,
            payload,
            created_at: now,
            retry_count: 0,
            last_retry_at: None,
            status: RecordStatus::Pending,
        }
    }

    /// True if never retried, or the retry interval has elapsed since the last retry
    pub fn is_ready_for_retry(&self, now: DateTime<Utc>, retry_interval: Duration) -> bool {
        match self.last_retry_at {
            None => true,
            Some(last) => now >= last + retry_interval,
        }
    }

    pub fn has_exceeded_retries(&self, max_retries: u32) -> bool {
        self.retry_count >= max_retries
    }

    pub fn record_retry(&mut self, now: DateTime<Utc>) {
        self.retry_count += 1;
        self.last_retry_at = Some(now);
    }

    /// Whether `other` is the same revision of this record.
    /// Used to detect a record that was replaced or retried while a call was in flight.
    pub fn same_revision(&self, other: &VerificationRecord) -> bool {
        self.created_at == other.created_at
            && self.retry_count == other.retry_count
            && self.last_retry_at == other.last_retry_at
    }
}
