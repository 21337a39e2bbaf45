//! HTTP mail relay client

use async_trait::async_trait;
use mv_core::services::notification::MailService;
use mv_shared::config::MailConfig;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::mask_email;
use crate::InfrastructureError;

const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

#[derive(Serialize)]
struct OutboundMail<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

enum Attempt {
    Sent(String),
    Retry(String),
    Fatal(String),
}

pub struct HttpMailService {
    client: Client,
    config: MailConfig,
    retry_delay: Duration,
}

impl HttpMailService {
    pub fn new(config: MailConfig) -> Result<Self, InfrastructureError> {
        if config.endpoint.trim().is_empty() {
            return Err(InfrastructureError::Config(
                "mail.endpoint is required for the http provider".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config,
            retry_delay: DEFAULT_RETRY_DELAY,
        })
    }

    /// Base delay before the first retry; doubles on each further attempt
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    async fn attempt(&self, to: &str, subject: &str, body: &str) -> Attempt {
        let mail = OutboundMail {
            from: &self.config.from_address,
            to,
            subject,
            text: body,
        };

        let mut request = self.client.post(&self.config.endpoint).json(&mail);
        if !self.config.api_key.is_empty() {
            request = request.bearer_auth(&self.config.api_key);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return Attempt::Retry(format!("request failed: {}", e.without_url())),
        };

        let status = response.status();
        if status.is_success() {
            let payload: JsonValue = response.json().await.unwrap_or(JsonValue::Null);
            return Attempt::Sent(message_id(&payload));
        }

        let reason = format!("relay returned HTTP {}", status.as_u16());
        if is_retryable_status(status) {
            Attempt::Retry(reason)
        } else {
            Attempt::Fatal(reason)
        }
    }

    async fn send_with_retry(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<String, InfrastructureError> {
        let max_attempts = self.config.max_retries.max(1);
        let mut attempts = 0;
        let mut delay = self.retry_delay;

        loop {
            attempts += 1;
            debug!(
                to = %mask_email(to),
                attempt = attempts,
                max_attempts = max_attempts,
                "Sending email"
            );

            match self.attempt(to, subject, body).await {
                Attempt::Sent(id) => {
                    info!(to = %mask_email(to), message_id = %id, "Email sent");
                    return Ok(id);
                }
                Attempt::Fatal(reason) => {
                    error!(to = %mask_email(to), error = %reason, "Mail relay rejected message");
                    return Err(InfrastructureError::Mail(reason));
                }
                Attempt::Retry(reason) if attempts >= max_attempts => {
                    error!(
                        to = %mask_email(to),
                        attempts = attempts,
                        error = %reason,
                        "Giving up sending email"
                    );
                    return Err(InfrastructureError::Mail(format!(
                        "Failed to send email after {} attempts: {}",
                        attempts, reason
                    )));
                }
                Attempt::Retry(reason) => {
                    warn!(
                        to = %mask_email(to),
                        attempt = attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %reason,
                        "Email send failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }
}

#[async_trait]
impl MailService for HttpMailService {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<String, String> {
        self.send_with_retry(to, subject, body)
            .await
            .map_err(|e| e.to_string())
    }
}

/// Throttling and server faults are retried; other client errors are final
pub(crate) fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn message_id(payload: &JsonValue) -> String {
    ["id", "message_id", "messageId"]
        .iter()
        .find_map(|field| payload[*field].as_str())
        .map(str::to_string)
        .unwrap_or_else(|| format!("relay-{}", uuid::Uuid::new_v4()))
}
