//! Mail delivery
//!
//! - **HTTP relay**: JSON POST to a transactional mail API, with retry
//! - **Log**: writes messages to the log, for development

pub mod http_mail;
pub mod log_mail;

#[cfg(test)]
mod tests;

use mv_core::services::notification::MailService;
use mv_shared::config::{MailConfig, MailProvider};
use std::sync::Arc;
use tracing::{info, warn};

use crate::InfrastructureError;

pub use http_mail::HttpMailService;
pub use log_mail::LogMailService;

/// Mask the local part of an address for logging
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            format!("{}***@{}", first, domain)
        }
        None => "***".to_string(),
    }
}

/// Create the mail service selected by configuration
pub fn create_mail_service(
    config: &MailConfig,
) -> Result<Arc<dyn MailService>, InfrastructureError> {
    match config.provider {
        MailProvider::Log => {
            warn!("Mail provider is 'log'; messages are not delivered");
            Ok(Arc::new(LogMailService::new()))
        }
        MailProvider::Http => {
            let service = HttpMailService::new(config.clone())?;
            info!(endpoint = %config.endpoint, "Using HTTP mail relay");
            Ok(Arc::new(service))
        }
    }
}
