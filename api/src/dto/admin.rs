use chrono::{DateTime, Utc};
use mv_core::domain::entities::{AuditStatus, RecordStatus};
use mv_core::{SubjectContact, VerificationRecord, VerificationType};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_LOG_LIMIT: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetVerifiedRequest {
    pub verification_type: VerificationType,
    pub verified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ContactRequest {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    #[validate(length(max = 200))]
    pub display_name: Option<String>,
}

impl From<ContactRequest> for SubjectContact {
    fn from(request: ContactRequest) -> Self {
        SubjectContact {
            email: request.email,
            first_name: request.first_name,
            last_name: request.last_name,
            display_name: request.display_name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LogsQuery {
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<usize>,
    pub status: Option<AuditStatus>,
    #[validate(length(min = 1, max = 128))]
    pub subject_id: Option<String>,
}

impl LogsQuery {
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LOG_LIMIT)
    }
}

/// Queue entry without the form payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingRecordSummary {
    pub subject_id: String,
    pub verification_type: VerificationType,
    pub created_at: DateTime<Utc>,
    pub retry_count: u32,
    pub last_retry_at: Option<DateTime<Utc>>,
    pub status: RecordStatus,
}

impl From<VerificationRecord> for PendingRecordSummary {
    fn from(record: VerificationRecord) -> Self {
        Self {
            subject_id: record.subject_id,
            verification_type: record.verification_type,
            created_at: record.created_at,
            retry_count: record.retry_count,
            last_retry_at: record.last_retry_at,
            status: record.status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingCancelledResponse {
    pub removed: usize,
}
