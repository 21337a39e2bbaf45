//! Audit log entity for confirmation API exchanges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuditStatus {
    /// HTTP 200
    Success,
    /// Any other HTTP status
    Failed,
    /// Transport failure, no HTTP status at all
    Error,
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Error => "error",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "success" => Some(Self::Success),
            "failed" => Some(Self::Failed),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditResponse {
    Http { code: u16, body: JsonValue },
    TransportError { message: String },
}

impl AuditResponse {
    pub fn status(&self) -> AuditStatus {
        match self {
            Self::Http { code: 200, .. } => AuditStatus::Success,
            Self::Http { .. } => AuditStatus::Failed,
            Self::TransportError { .. } => AuditStatus::Error,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub subject_id: String,
    /// Request body with sensitive fields replaced
    pub request: JsonValue,
    pub response: AuditResponse,
    pub status: AuditStatus,
}

impl AuditLogEntry {
    pub fn new(
        subject_id: impl Into<String>,
        request: JsonValue,
        response: AuditResponse,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let status = response.status();
        Self {
            id: Uuid::new_v4(),
            timestamp,
            subject_id: subject_id.into(),
            request,
            response,
            status,
        }
    }
}
