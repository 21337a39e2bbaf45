//! Development mail sender that only logs

use async_trait::async_trait;
use mv_core::services::notification::MailService;
use tracing::info;

use super::mask_email;

/// Logs each message instead of delivering it. The body is logged in full so
/// OTP codes can be read during local testing.
#[derive(Debug, Default, Clone)]
pub struct LogMailService;

impl LogMailService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MailService for LogMailService {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<String, String> {
        let message_id = format!("log-{}", uuid::Uuid::new_v4());
        info!(
            to = %mask_email(to),
            subject = subject,
            message_id = %message_id,
            body = body,
            "Email (not delivered)"
        );
        Ok(message_id)
    }
}
