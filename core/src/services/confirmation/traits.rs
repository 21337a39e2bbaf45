//! HTTP transport port for the confirmation API

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use std::time::Duration;

/// One `POST {base}/status` call
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub url: String,
    pub api_key: String,
    pub body: JsonValue,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn confirmed() -> Self {
        Self::new(200, json!({"veteran_status": "confirmed"}).to_string())
    }

    pub fn not_confirmed(reason: &str) -> Self {
        Self::new(
            200,
            json!({"veteran_status": "not confirmed", "not_confirmed_reason": reason}).to_string(),
        )
    }

    /// Body as JSON, or as a JSON string when it does not parse
    pub fn json(&self) -> JsonValue {
        serde_json::from_str(&self.body).unwrap_or_else(|_| JsonValue::String(self.body.clone()))
    }
}

#[async_trait]
pub trait ConfirmationTransport: Send + Sync {
    /// Returns `Err` only when no HTTP response was received
    async fn post_json(&self, request: &TransportRequest) -> Result<TransportResponse, String>;
}
