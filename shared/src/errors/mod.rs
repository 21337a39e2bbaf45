//! Error response structure shared by every HTTP endpoint

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Standard error response structure used across all API endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub error: String,

    /// Human-readable, sanitized message
    pub message: String,

    /// Additional details (remaining lockout time, field errors, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,

    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    /// Attach a single detail value
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }
}

pub mod error_codes {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const CONFIGURATION_ERROR: &str = "CONFIGURATION_ERROR";
    pub const LOCKED_OUT: &str = "LOCKED_OUT";
    pub const COOLDOWN_ACTIVE: &str = "COOLDOWN_ACTIVE";
    pub const CONFLICT: &str = "CONFLICT";
    pub const TRANSIENT_ERROR: &str = "TRANSIENT_ERROR";
    pub const DELIVERY_FAILED: &str = "DELIVERY_FAILED";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const DATA_CORRUPTED: &str = "DATA_CORRUPTED";
    pub const VERIFICATION_DENIED: &str = "VERIFICATION_DENIED";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
}
