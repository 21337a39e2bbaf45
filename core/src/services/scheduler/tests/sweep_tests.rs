use chrono::Duration;

use crate::clock::Clock;
use crate::domain::entities::VerificationType;
use crate::repositories::{KeyValueStore, ProfileRepository};
use crate::services::confirmation::TransportResponse;
use crate::services::queue::QUEUE_INDEX_KEY;
use crate::test_support::{test_settings, veteran_form, Harness};

const SUBJECT: &str = "42";

async fn harness_with_pending() -> Harness {
    let h = Harness::new()
        .with_contact(SUBJECT, "vet@example.com", "Tamara", "Ellis")
        .await;
    h.service
        .queue()
        .enqueue(SUBJECT, VerificationType::Veteran, veteran_form())
        .await
        .unwrap();
    h
}

#[tokio::test]
async fn test_confirmed_record_is_approved_and_removed() {
    let h = harness_with_pending().await;
    h.transport.push(Ok(TransportResponse::confirmed())).await;

    let report = h.service.run_manual_sweep().await.unwrap();
    assert_eq!(report.processed, 1);
    assert_eq!(report.approved, 1);

    assert!(h.service.queue().peek(SUBJECT).await.unwrap().is_none());
    let verified = h.profiles.get_verified(SUBJECT, VerificationType::Veteran).await.unwrap();
    assert_eq!(verified.map(|v| v.verified_at), Some(h.clock.now()));

    let mail = h.mail.last_to("vet@example.com").await.unwrap();
    assert!(mail.subject.contains("has been verified"));
}

#[tokio::test]
async fn test_error_reason_keeps_record_pending() {
    let h = harness_with_pending().await;
    h.transport.set_fallback(Ok(TransportResponse::not_confirmed("ERROR"))).await;

    for _ in 0..3 {
        let report = h.service.run_manual_sweep().await.unwrap();
        assert_eq!(report.retried, 1);
        h.clock.advance(Duration::hours(1));
    }

    let record = h.service.queue().peek(SUBJECT).await.unwrap().unwrap();
    assert_eq!(record.retry_count, 3);
    assert!(h.mail.sent().await.is_empty());
}

#[tokio::test]
async fn test_record_waits_for_retry_interval() {
    let h = harness_with_pending().await;
    h.transport.set_fallback(Err("timed out".to_string())).await;

    assert_eq!(h.service.run_manual_sweep().await.unwrap().retried, 1);

    h.clock.advance(Duration::minutes(59));
    let report = h.service.run_manual_sweep().await.unwrap();
    assert_eq!(report.skipped_not_ready, 1);
    assert_eq!(h.transport.call_count().await, 1);
}

#[tokio::test]
async fn test_exhausted_record_is_denied_without_calling_api() {
    let h = harness_with_pending().await;
    let queue = h.service.queue();
    let mut record = queue.peek(SUBJECT).await.unwrap().unwrap();
    record.retry_count = queue.settings().max_retries;
    queue.update(SUBJECT, &record).await.unwrap();

    let report = h.service.run_manual_sweep().await.unwrap();
    assert_eq!(report.exhausted, 1);
    assert_eq!(h.transport.call_count().await, 0);
    assert!(queue.list_pending().await.unwrap().is_empty());

    let mail = h.mail.last_to("vet@example.com").await.unwrap();
    assert!(mail.body.contains("after several attempts"));

    // Never retried again
    h.clock.advance(Duration::hours(2));
    assert_eq!(h.service.run_manual_sweep().await.unwrap().processed, 0);
}

#[tokio::test]
async fn test_permanent_denial_removes_record() {
    let h = harness_with_pending().await;
    h.transport.push(Ok(TransportResponse::not_confirmed("PERSON_NOT_FOUND"))).await;

    let report = h.service.run_manual_sweep().await.unwrap();
    assert_eq!(report.denied, 1);
    assert!(h.service.queue().peek(SUBJECT).await.unwrap().is_none());
    assert!(h
        .profiles
        .get_verified(SUBJECT, VerificationType::Veteran)
        .await
        .unwrap()
        .is_none());

    let mail = h.mail.last_to("vet@example.com").await.unwrap();
    assert!(mail.body.contains("could not find a veteran record"));
}

#[tokio::test]
async fn test_dangling_and_corrupted_entries_are_dropped() {
    let h = harness_with_pending().await;
    h.store.set("queue:record:42", "not a sealed blob").await.unwrap();
    h.store
        .set(QUEUE_INDEX_KEY, r#"["42","ghost"]"#)
        .await
        .unwrap();

    let report = h.service.run_manual_sweep().await.unwrap();
    assert_eq!(report.dangling, 2);
    assert_eq!(h.transport.call_count().await, 0);
    assert!(h.service.queue().list_pending().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_one_failing_subject_does_not_abort_sweep() {
    let h = harness_with_pending().await;
    h.service
        .queue()
        .enqueue("43", VerificationType::Veteran, veteran_form())
        .await
        .unwrap();
    h.transport.push(Ok(TransportResponse::confirmed())).await;
    h.transport.push(Ok(TransportResponse::confirmed())).await;
    h.mail.set_should_fail(true);

    let report = h.service.run_manual_sweep().await.unwrap();
    assert_eq!(report.processed, 2);
    assert_eq!(report.approved, 2);
}

#[tokio::test]
async fn test_missing_api_key_leaves_record_untouched() {
    let mut settings = test_settings();
    settings.va_api.api_key.clear();
    let h = Harness::with_settings(settings);
    h.service
        .queue()
        .enqueue(SUBJECT, VerificationType::Veteran, veteran_form())
        .await
        .unwrap();

    let report = h.service.run_manual_sweep().await.unwrap();
    assert_eq!(report.failed, 1);
    let record = h.service.queue().peek(SUBJECT).await.unwrap().unwrap();
    assert_eq!(record.retry_count, 0);
}

#[tokio::test]
async fn test_sweep_is_noop_when_confirmation_disabled() {
    let mut settings = test_settings();
    settings.va_api.enabled = false;
    let h = Harness::with_settings(settings);
    h.service
        .queue()
        .enqueue(SUBJECT, VerificationType::Veteran, veteran_form())
        .await
        .unwrap();

    let report = h.service.run_scheduled_sweep().await.unwrap().unwrap();
    assert_eq!(report.processed, 0);
    assert_eq!(h.service.queue().pending_count().await.unwrap(), 1);
}
