//! Mail transport port

use async_trait::async_trait;

#[async_trait]
pub trait MailService: Send + Sync {
    /// Send a fully rendered message; returns a transport message id
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<String, String>;
}
