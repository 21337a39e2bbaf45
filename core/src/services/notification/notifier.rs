//! Renders notifications and hands them to the mail transport

use std::sync::Arc;

use super::{render, MailService, Notification};
use crate::domain::entities::SubjectContact;
use crate::errors::{DomainError, DomainResult};
use crate::repositories::ProfileRepository;

pub struct Notifier {
    mail: Arc<dyn MailService>,
    profiles: Arc<dyn ProfileRepository>,
    site_title: String,
}

impl Notifier {
    pub fn new(
        mail: Arc<dyn MailService>,
        profiles: Arc<dyn ProfileRepository>,
        site_title: impl Into<String>,
    ) -> Self {
        Self {
            mail,
            profiles,
            site_title: site_title.into(),
        }
    }

    /// Send to `to`, addressing the subject by their profile name
    pub async fn send_to(
        &self,
        subject_id: &str,
        to: &str,
        notification: &Notification,
    ) -> DomainResult<String> {
        let contact = self
            .profiles
            .get_contact(subject_id)
            .await
            .map_err(DomainError::storage)?
            .unwrap_or_default();

        let (subject, body) = self.compose(&contact, notification);
        let message_id = self
            .mail
            .send_email(to, &subject, &body)
            .await
            .map_err(|message| DomainError::Delivery { message })?;

        tracing::info!(
            subject_id = subject_id,
            notification = notification.kind(),
            message_id = %message_id,
            event = "notification_sent",
            "Notification sent"
        );
        Ok(message_id)
    }

    /// Send to the subject's profile address
    pub async fn notify(&self, subject_id: &str, notification: &Notification) -> DomainResult<String> {
        let email = self
            .profiles
            .get_contact(subject_id)
            .await
            .map_err(DomainError::storage)?
            .and_then(|c| c.email)
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| DomainError::NotFound {
                resource: format!("email address for subject {}", subject_id),
            })?;

        self.send_to(subject_id, &email, notification).await
    }

    /// Failures are logged and swallowed; notifications never change verification state
    pub async fn notify_best_effort(&self, subject_id: &str, notification: &Notification) {
        if let Err(e) = self.notify(subject_id, notification).await {
            tracing::warn!(
                subject_id = subject_id,
                notification = notification.kind(),
                error = %e,
                event = "notification_failed",
                "Failed to send notification"
            );
        }
    }

    fn compose(&self, contact: &SubjectContact, notification: &Notification) -> (String, String) {
        let mut values = vec![
            ("site_title", self.site_title.clone()),
            ("customer_name", contact.greeting_name()),
        ];
        values.extend(notification.placeholders());

        let template = notification.template();
        (render(template.subject, &values), render(template.body, &values))
    }
}
