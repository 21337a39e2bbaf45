//! In-memory service behind the real route table

#![allow(dead_code)]

use actix_web::web;
use chrono::{TimeZone, Utc};
use mv_api::AppState;
use mv_core::repositories::{InMemoryEphemeralCache, InMemoryKeyValueStore, InMemoryProfileRepository};
use mv_core::services::{RecordingMailService, StubConfirmationTransport};
use mv_core::{MockClock, ServicePorts, VerificationService};
use mv_shared::config::{EncryptionConfig, VerificationSettings};
use serde_json::Value;
use std::sync::Arc;

pub const ADMIN_TOKEN: &str = "admin-test-token";

pub struct TestApp {
    pub state: web::Data<AppState>,
    pub clock: Arc<MockClock>,
    pub mail: Arc<RecordingMailService>,
    pub transport: Arc<StubConfirmationTransport>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_admin_token(ADMIN_TOKEN)
    }

    pub fn with_admin_token(token: &str) -> Self {
        let clock = Arc::new(MockClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()));
        let mail = Arc::new(RecordingMailService::new());
        let transport = Arc::new(StubConfirmationTransport::new());

        let ports = ServicePorts {
            store: Arc::new(InMemoryKeyValueStore::new()),
            cache: Arc::new(InMemoryEphemeralCache::new(clock.clone())),
            profiles: Arc::new(InMemoryProfileRepository::new()),
            mail: mail.clone(),
            transport: transport.clone(),
            clock: clock.clone(),
        };

        let mut settings = VerificationSettings::default();
        settings.va_api.api_key = "test-key".to_string();
        let encryption = EncryptionConfig {
            key: None,
            host_secret: "api-test-secret".to_string(),
        };
        let service = VerificationService::new(ports, settings, encryption, "Test Store").unwrap();

        Self {
            state: web::Data::new(AppState::new(Arc::new(service), token)),
            clock,
            mail,
            transport,
        }
    }

    /// Six-digit code from the last OTP email sent to `to`
    pub async fn sent_code(&self, to: &str) -> String {
        let mail = self.mail.last_to(to).await.expect("code was mailed");
        mail.body
            .split("code is: ")
            .nth(1)
            .map(|rest| rest.chars().take_while(|c| c.is_ascii_digit()).collect())
            .expect("body carries the code")
    }
}

pub fn veteran_form() -> Value {
    serde_json::json!({
        "firstName": "Tamara",
        "lastName": "Ellis",
        "birthDate": "1967-06-19",
        "zipCode": "36242",
    })
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

/// Route table wrapped the way `main` wraps it
macro_rules! init_app {
    ($app:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($app.state.clone())
                .wrap(tracing_actix_web::TracingLogger::default())
                .configure(mv_api::configure),
        )
        .await
    };
}
