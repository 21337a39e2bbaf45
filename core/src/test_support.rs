//! Fully wired service over in-memory ports

use chrono::{TimeZone, Utc};
use mv_shared::config::{EncryptionConfig, VerificationSettings};
use std::sync::Arc;

use crate::clock::MockClock;
use crate::domain::entities::{FormPayload, SubjectContact};
use crate::repositories::{InMemoryEphemeralCache, InMemoryKeyValueStore, InMemoryProfileRepository};
use crate::services::confirmation::{ConfirmationTransport, StubConfirmationTransport};
use crate::services::notification::RecordingMailService;
use crate::services::verification::{ServicePorts, VerificationService};

pub(crate) struct Harness {
    pub service: VerificationService,
    pub clock: Arc<MockClock>,
    pub store: Arc<InMemoryKeyValueStore>,
    pub profiles: Arc<InMemoryProfileRepository>,
    pub mail: Arc<RecordingMailService>,
    pub transport: Arc<StubConfirmationTransport>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(test_settings())
    }

    pub fn with_settings(settings: VerificationSettings) -> Self {
        let clock = Arc::new(MockClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()));
        let store = Arc::new(InMemoryKeyValueStore::new());
        let cache = Arc::new(InMemoryEphemeralCache::new(clock.clone()));
        let profiles = Arc::new(InMemoryProfileRepository::new());
        let mail = Arc::new(RecordingMailService::new());
        let transport = Arc::new(StubConfirmationTransport::new());

        let ports = ServicePorts {
            store: store.clone(),
            cache,
            profiles: profiles.clone(),
            mail: mail.clone(),
            transport: transport.clone(),
            clock: clock.clone(),
        };
        let service = build_service(ports, settings);

        Self {
            service,
            clock,
            store,
            profiles,
            mail,
            transport,
        }
    }

    pub async fn with_contact(self, subject_id: &str, email: &str, first: &str, last: &str) -> Self {
        self.profiles
            .upsert_contact(
                subject_id,
                SubjectContact {
                    email: Some(email.to_string()),
                    first_name: Some(first.to_string()),
                    last_name: Some(last.to_string()),
                    display_name: None,
                },
            )
            .await;
        self
    }
}

/// Service over fresh in-memory ports and a caller-supplied transport
pub(crate) fn service_with_transport(transport: Arc<dyn ConfirmationTransport>) -> VerificationService {
    let clock = Arc::new(MockClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()));
    let ports = ServicePorts {
        store: Arc::new(InMemoryKeyValueStore::new()),
        cache: Arc::new(InMemoryEphemeralCache::new(clock.clone())),
        profiles: Arc::new(InMemoryProfileRepository::new()),
        mail: Arc::new(RecordingMailService::new()),
        transport,
        clock,
    };
    build_service(ports, test_settings())
}

fn build_service(ports: ServicePorts, settings: VerificationSettings) -> VerificationService {
    let encryption = EncryptionConfig {
        key: None,
        host_secret: "test-host-secret".to_string(),
    };
    VerificationService::new(ports, settings, encryption, "Test Store").unwrap()
}

pub(crate) fn test_settings() -> VerificationSettings {
    let mut settings = VerificationSettings::default();
    settings.va_api.api_key = "test-key".to_string();
    settings
}

pub(crate) fn veteran_form() -> FormPayload {
    [
        ("firstName", "Tamara"),
        ("lastName", "Ellis"),
        ("birthDate", "1967-06-19"),
        ("zipCode", "36242"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}
