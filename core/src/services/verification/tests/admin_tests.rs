use crate::domain::entities::{SubjectContact, VerificationType};
use crate::repositories::{KeyValueStore, ProfileRepository};
use crate::services::confirmation::TransportResponse;
use crate::test_support::{test_settings, veteran_form, Harness};

async fn queue_for(h: &Harness, subject_id: &str) {
    h.transport.push(Ok(TransportResponse::not_confirmed("ERROR"))).await;
    h.service
        .submit_veteran_verification(subject_id, veteran_form())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_set_verified_override() {
    let h = Harness::new();
    h.service
        .set_verified("1", VerificationType::Military, true)
        .await
        .unwrap();
    assert!(h.service.get_status("1").await.unwrap().is_military);

    h.service
        .set_verified("1", VerificationType::Military, false)
        .await
        .unwrap();
    assert!(h
        .profiles
        .get_verified("1", VerificationType::Military)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_cancel_pending() {
    let h = Harness::new();
    queue_for(&h, "1").await;
    queue_for(&h, "2").await;
    queue_for(&h, "3").await;

    assert!(h.service.cancel_pending("1").await.unwrap());
    assert!(!h.service.cancel_pending("1").await.unwrap());
    assert_eq!(h.service.pending_details().await.unwrap().len(), 2);

    assert_eq!(h.service.cancel_all_pending().await.unwrap(), 2);
    assert!(h.service.queue().list_pending().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unlock_clears_lockout() {
    let h = Harness::new();
    let lockout = h.service.lockout();
    lockout
        .set_lockout("1", VerificationType::Veteran, 60)
        .await
        .unwrap();
    assert!(lockout.is_locked_out("1", VerificationType::Veteran).await.unwrap());

    h.service.unlock("1", VerificationType::Veteran).await.unwrap();
    assert!(!lockout.is_locked_out("1", VerificationType::Veteran).await.unwrap());
}

#[tokio::test]
async fn test_encryption_status() {
    let h = Harness::new();
    let status = h.service.encryption_status().await;
    assert!(status.authenticated);
    assert_eq!(status.key_source, Some("generated"));
    assert!(status.self_test_passed);

    let mut settings = test_settings();
    settings.general.disable_encryption = true;
    let h = Harness::with_settings(settings);
    let status = h.service.encryption_status().await;
    assert!(!status.authenticated);
    assert_eq!(status.key_source, None);
    assert!(status.self_test_passed);
}

#[tokio::test]
async fn test_pending_payload_is_encrypted_at_rest() {
    let h = Harness::new();
    queue_for(&h, "1").await;

    let keys = h.store.keys().await;
    let record_key = keys.iter().find(|k| k.starts_with("queue:record:")).unwrap();
    let blob = h.store.get(record_key).await
        .unwrap()
        .unwrap();
    assert!(!blob.contains("Tamara"));
    assert!(!blob.contains("1967-06-19"));
}

#[tokio::test]
async fn test_connection_uses_reference_identity() {
    let h = Harness::new();
    let result = h.service.test_connection().await;
    assert!(result.success);

    let requests = h.transport.requests().await;
    assert_eq!(requests[0].body["firstName"], "Tamara");
    assert_eq!(requests[0].body["zipCode"], "36242");
    assert_eq!(h.service.queue().pending_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_update_contact_feeds_notifications() {
    let h = Harness::new();
    let contact = SubjectContact {
        email: Some("tamara@example.com".to_string()),
        first_name: Some("Tamara".to_string()),
        last_name: Some("Ellis".to_string()),
        display_name: None,
    };
    h.service.update_contact("5", contact.clone()).await.unwrap();
    assert_eq!(h.profiles.get_contact("5").await.unwrap(), Some(contact));

    h.transport.push(Ok(TransportResponse::not_confirmed("PERSON_NOT_FOUND"))).await;
    h.service
        .submit_veteran_verification("5", veteran_form())
        .await
        .unwrap();
    h.service.run_manual_sweep().await.unwrap();
    assert!(h.mail.sent().await.is_empty());

    queue_for(&h, "5").await;
    h.clock.advance(chrono::Duration::hours(2));
    h.transport.push(Ok(TransportResponse::confirmed())).await;
    h.service.run_manual_sweep().await.unwrap();

    let sent = h.mail.last_to("tamara@example.com").await.unwrap();
    assert!(sent.body.contains("Tamara"));
}
