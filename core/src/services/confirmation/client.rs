use mv_shared::config::VaApiSettings;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::{
    AuditResponse, ConfirmationOutcome, ConnectionTestResult, DenialReason, FormPayload,
};
use crate::errors::{DomainError, DomainResult};
use crate::services::audit::AuditLogger;

use super::request::build_request_body;
use super::{ConfirmationTransport, TransportRequest, TransportResponse};

pub const SANDBOX_BASE_URL: &str = "https://sandbox-api.va.gov/services/veteran-confirmation/v1";

pub const PRODUCTION_BASE_URL: &str = "https://api.va.gov/services/veteran-confirmation/v1";

/// Subject id recorded in the audit log for connection tests
pub const CONNECTION_TEST_SUBJECT: &str = "connection-test";

const MAX_ERROR_TITLE_LEN: usize = 80;

/// Synchronous veteran status confirmation.
///
/// Every call is written to the audit log, including calls that never got an
/// HTTP response. Failures reach the caller as [`DomainError::Transient`] with a
/// sanitized message; raw upstream bodies stay in the audit log.
pub struct ConfirmationClient {
    transport: Arc<dyn ConfirmationTransport>,
    audit: Arc<AuditLogger>,
    settings: VaApiSettings,
}

impl ConfirmationClient {
    pub fn new(
        transport: Arc<dyn ConfirmationTransport>,
        audit: Arc<AuditLogger>,
        settings: VaApiSettings,
    ) -> Self {
        Self {
            transport,
            audit,
            settings,
        }
    }

    pub fn settings(&self) -> &VaApiSettings {
        &self.settings
    }

    /// Sandbox wins over a custom URL; production is the fallback
    pub fn base_url(&self) -> String {
        let custom = self.settings.api_url.trim();
        if self.settings.sandbox {
            SANDBOX_BASE_URL.to_string()
        } else if !custom.is_empty() {
            custom.trim_end_matches('/').to_string()
        } else {
            PRODUCTION_BASE_URL.to_string()
        }
    }

    pub fn status_url(&self) -> String {
        format!("{}/status", self.base_url())
    }

    pub async fn verify(
        &self,
        subject_id: &str,
        payload: &FormPayload,
    ) -> DomainResult<ConfirmationOutcome> {
        let api_key = self.settings.api_key.trim();
        if api_key.is_empty() {
            return Err(DomainError::configuration("VA API key not configured"));
        }

        let body = build_request_body(payload)?;
        let request = TransportRequest {
            url: self.status_url(),
            api_key: api_key.to_string(),
            body,
            timeout: Duration::from_secs(self.settings.timeout_secs),
        };

        let result = self.transport.post_json(&request).await;

        let audit_response = match &result {
            Ok(response) => AuditResponse::Http {
                code: response.status,
                body: response.json(),
            },
            Err(message) => AuditResponse::TransportError {
                message: message.clone(),
            },
        };
        if let Err(e) = self.audit.log(subject_id, &request.body, audit_response).await {
            tracing::error!(
                subject_id = subject_id,
                error = %e,
                event = "audit_log_failed",
                "Failed to record confirmation exchange"
            );
        }

        let response = result.map_err(|message| {
            tracing::warn!(
                subject_id = subject_id,
                error = %message,
                event = "confirmation_transport_failed",
                "Confirmation API unreachable"
            );
            DomainError::Transient {
                message: "Verification service unreachable".to_string(),
            }
        })?;

        let outcome = classify_response(&response);
        match &outcome {
            Ok(outcome) => tracing::info!(
                subject_id = subject_id,
                outcome = ?outcome,
                event = "confirmation_received",
                "Confirmation API answered"
            ),
            Err(e) => tracing::warn!(
                subject_id = subject_id,
                http_status = response.status,
                error = %e,
                event = "confirmation_failed",
                "Confirmation API returned an error"
            ),
        }
        outcome
    }

    /// Canned lookup against the sandbox reference identity
    pub async fn test_connection(&self) -> ConnectionTestResult {
        if self.settings.api_key.trim().is_empty() {
            return ConnectionTestResult {
                success: false,
                message: "VA API key is not configured".to_string(),
            };
        }

        let payload: FormPayload = [
            ("firstName", "Tamara"),
            ("lastName", "Ellis"),
            ("birthDate", "1967-06-19"),
            ("zipCode", "36242"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        match self.verify(CONNECTION_TEST_SUBJECT, &payload).await {
            Ok(ConfirmationOutcome::Confirmed) => ConnectionTestResult {
                success: true,
                message: "API connection successful. Test result: confirmed".to_string(),
            },
            Ok(ConfirmationOutcome::NotConfirmed(reason)) => ConnectionTestResult {
                success: true,
                message: format!("API connection successful. Test result: not confirmed ({})", reason),
            },
            Err(e) => ConnectionTestResult {
                success: false,
                message: e.to_string(),
            },
        }
    }
}

/// Map an HTTP response to a verdict.
///
/// Only a 200 carries a verdict. A 200 without a reason code reads as `ERROR`.
pub fn classify_response(response: &TransportResponse) -> DomainResult<ConfirmationOutcome> {
    if response.status != 200 {
        let title = serde_json::from_str::<JsonValue>(&response.body)
            .ok()
            .and_then(|body| body["errors"][0]["title"].as_str().map(sanitize_title))
            .filter(|title| !title.is_empty());

        let message = match title {
            Some(title) => format!("Verification service returned HTTP {}: {}", response.status, title),
            None => format!("Verification service returned HTTP {}", response.status),
        };
        return Err(DomainError::Transient { message });
    }

    let body: JsonValue = serde_json::from_str(&response.body).map_err(|_| DomainError::Transient {
        message: "Verification service returned an unreadable response".to_string(),
    })?;

    if body["veteran_status"].as_str() == Some("confirmed") {
        return Ok(ConfirmationOutcome::Confirmed);
    }

    let reason = body["not_confirmed_reason"].as_str().unwrap_or_default();
    Ok(ConfirmationOutcome::NotConfirmed(DenialReason::parse(reason)))
}

fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.'))
        .take(MAX_ERROR_TITLE_LEN)
        .collect::<String>()
        .trim()
        .to_string()
}
