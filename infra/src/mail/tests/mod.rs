
use mv_core::services::notification::MailService;
use mv_shared::config::{MailConfig, MailProvider};

use super::{create_mail_service, mask_email, LogMailService};

#[test]
fn test_mask_email() {
    assert_eq!(mask_email("john.smith@army.mil"), "j***@army.mil");
    assert_eq!(mask_email("not-an-address"), "***");
}

#[tokio::test]
async fn test_log_mail_service_returns_message_id() {
    let service = LogMailService::new();
    let id = service
        .send_email("john.smith@army.mil", "Code", "123456")
        .await
        .unwrap();
    assert!(id.starts_with("log-"));
}

#[test]
fn test_http_provider_requires_endpoint() {
    let config = MailConfig {
        provider: MailProvider::Http,
        ..Default::default()
    };
    assert!(create_mail_service(&config).is_err());

    let config = MailConfig {
        provider: MailProvider::Http,
        endpoint: "https://mail.example.com/send".to_string(),
        ..Default::default()
    };
    assert!(create_mail_service(&config).is_ok());
}

#[test]
fn test_log_provider_is_default() {
    assert!(create_mail_service(&MailConfig::default()).is_ok());
}
