use chrono::Duration;
use mv_shared::config::{EncryptionConfig, QueueSettings};
use std::sync::Arc;

use crate::clock::MockClock;
use crate::domain::entities::{FormPayload, VerificationType};
use crate::errors::DomainError;
use crate::repositories::{InMemoryKeyValueStore, KeyValueStore};
use crate::services::encryption::{AesGcmPayloadCipher, KeyManager, PayloadCipher};
use crate::services::locks::SubjectLocks;
use crate::services::queue::{VerificationQueue, QUEUE_INDEX_KEY};

struct Fixture {
    queue: VerificationQueue,
    store: Arc<InMemoryKeyValueStore>,
    clock: Arc<MockClock>,
}

fn fixture() -> Fixture {
    let store = Arc::new(InMemoryKeyValueStore::new());
    let clock = Arc::new(MockClock::default());
    let keys = Arc::new(KeyManager::new(
        store.clone(),
        EncryptionConfig {
            key: Some("queue-test-key".to_string()),
            host_secret: String::new(),
        },
    ));
    let cipher: Arc<dyn PayloadCipher> = Arc::new(AesGcmPayloadCipher::new(keys));
    let queue = VerificationQueue::new(store.clone(), cipher, clock.clone(), QueueSettings::default());
    Fixture { queue, store, clock }
}

fn payload(first_name: &str) -> FormPayload {
    let mut payload = FormPayload::new();
    payload.insert("firstName".to_string(), first_name.to_string());
    payload.insert("lastName".to_string(), "Ellis".to_string());
    payload.insert("birthDate".to_string(), "1967-06-19".to_string());
    payload
}

#[tokio::test]
async fn test_enqueue_then_peek() {
    let f = fixture();
    f.queue.enqueue("7", VerificationType::Veteran, payload("Tamara")).await.unwrap();

    let record = f.queue.peek("7").await.unwrap().unwrap();
    assert_eq!(record.subject_id, "7");
    assert_eq!(record.retry_count, 0);
    assert_eq!(record.payload["firstName"], "Tamara");
    assert_eq!(f.queue.list_pending().await.unwrap(), vec!["7".to_string()]);
}

#[tokio::test]
async fn test_record_is_encrypted_at_rest() {
    let f = fixture();
    f.queue.enqueue("7", VerificationType::Veteran, payload("Tamara")).await.unwrap();

    let raw = f.store.get("queue:record:7").await.unwrap().unwrap();
    assert!(!raw.contains("Tamara"));
    assert!(!raw.contains("1967-06-19"));
}

#[tokio::test]
async fn test_enqueue_twice_overwrites_without_duplicate_index() {
    let f = fixture();
    f.queue.enqueue("7", VerificationType::Veteran, payload("First")).await.unwrap();
    f.queue.increment_retry("7").await.unwrap();
    f.queue.enqueue("7", VerificationType::Veteran, payload("Second")).await.unwrap();

    let record = f.queue.peek("7").await.unwrap().unwrap();
    assert_eq!(record.payload["firstName"], "Second");
    assert_eq!(record.retry_count, 0);
    assert_eq!(f.queue.list_pending().await.unwrap().len(), 1);
    assert_eq!(f.queue.pending_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_corrupted_record_self_heals() {
    let f = fixture();
    f.queue.enqueue("7", VerificationType::Veteran, payload("Tamara")).await.unwrap();
    f.store.set("queue:record:7", "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA").await.unwrap();

    assert!(f.queue.peek("7").await.unwrap().is_none());
    assert!(f.store.get("queue:record:7").await.unwrap().is_none());
    assert!(f.queue.list_pending().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_remove_clears_record_and_index() {
    let f = fixture();
    f.queue.enqueue("1", VerificationType::Veteran, payload("A")).await.unwrap();
    f.queue.enqueue("2", VerificationType::Veteran, payload("B")).await.unwrap();

    assert!(f.queue.remove("1").await.unwrap());
    assert!(!f.queue.remove("1").await.unwrap());
    assert_eq!(f.queue.list_pending().await.unwrap(), vec!["2".to_string()]);
}

#[tokio::test]
async fn test_increment_retry_stamps_time() {
    let f = fixture();
    f.queue.enqueue("7", VerificationType::Veteran, payload("Tamara")).await.unwrap();
    f.clock.advance(Duration::minutes(10));

    let record = f.queue.increment_retry("7").await.unwrap();
    assert_eq!(record.retry_count, 1);
    assert_eq!(record.last_retry_at, Some(f.clock_now()));
    assert!(!f.queue.is_ready_for_retry(&record));

    f.clock.advance(Duration::hours(1));
    assert!(f.queue.is_ready_for_retry(&record));
}

#[tokio::test]
async fn test_increment_retry_on_missing_record_is_not_found() {
    let f = fixture();
    assert!(f.queue.increment_retry("missing").await.is_err());
}

#[tokio::test]
async fn test_has_exceeded_retries_uses_settings() {
    let f = fixture();
    f.queue.enqueue("7", VerificationType::Veteran, payload("Tamara")).await.unwrap();
    let mut record = f.queue.peek("7").await.unwrap().unwrap();
    for _ in 0..4 {
        record = f.queue.increment_retry("7").await.unwrap();
    }
    assert!(!f.queue.has_exceeded_retries(&record));
    record = f.queue.increment_retry("7").await.unwrap();
    assert!(f.queue.has_exceeded_retries(&record));
}

#[tokio::test]
async fn test_unreadable_index_rejects_enqueue_without_orphaning_records() {
    let f = fixture();
    f.queue.enqueue("a", VerificationType::Veteran, payload("Ada")).await.unwrap();
    f.store.set(QUEUE_INDEX_KEY, "{not json").await.unwrap();

    let err = f
        .queue
        .enqueue("b", VerificationType::Veteran, payload("Bo"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::DataCorruption { .. }));
    assert!(f.queue.list_pending().await.is_err());

    assert!(f.store.get("queue:record:a").await.unwrap().is_some());
    assert!(f.store.get("queue:record:b").await.unwrap().is_none());
    assert_eq!(f.store.get(QUEUE_INDEX_KEY).await.unwrap().as_deref(), Some("{not json"));
}

#[tokio::test]
async fn test_cancel_all_resets_unreadable_index() {
    let f = fixture();
    let locks = SubjectLocks::new();
    f.queue.enqueue("a", VerificationType::Veteran, payload("Ada")).await.unwrap();
    f.store.set(QUEUE_INDEX_KEY, "{not json").await.unwrap();

    assert_eq!(f.queue.cancel_all(&locks).await.unwrap(), 0);
    assert_eq!(f.store.get(QUEUE_INDEX_KEY).await.unwrap().as_deref(), Some("[]"));

    assert!(f.queue.remove("a").await.unwrap());
    f.queue.enqueue("b", VerificationType::Veteran, payload("Bo")).await.unwrap();
    assert_eq!(f.queue.list_pending().await.unwrap(), vec!["b".to_string()]);
}

#[tokio::test]
async fn test_pending_details_waits_for_subject_lock() {
    let f = Arc::new(fixture());
    let locks = Arc::new(SubjectLocks::new());
    f.queue.enqueue("1", VerificationType::Veteran, payload("One")).await.unwrap();

    let guard = locks.lock("1").await;
    let reader = {
        let f = f.clone();
        let locks = locks.clone();
        tokio::spawn(async move { f.queue.pending_details(&locks).await.unwrap().len() })
    };
    let canceller = {
        let f = f.clone();
        let locks = locks.clone();
        tokio::spawn(async move { f.queue.cancel_all(&locks).await.unwrap() })
    };

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    assert!(!reader.is_finished());
    assert!(!canceller.is_finished());

    // Rewritten while the lock is held; neither caller may act on the old snapshot
    f.queue.enqueue("1", VerificationType::Veteran, payload("Uno")).await.unwrap();
    drop(guard);

    let read = reader.await.unwrap();
    let removed = canceller.await.unwrap();
    assert!(read <= 1);
    assert_eq!(removed, 1);
    assert!(f.store.get("queue:record:1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_pending_details_and_cancel_all() {
    let f = fixture();
    for id in ["1", "2", "3"] {
        f.queue.enqueue(id, VerificationType::Veteran, payload(id)).await.unwrap();
    }
    f.store.set("queue:record:2", "garbage").await.unwrap();

    let locks = SubjectLocks::new();
    let details = f.queue.pending_details(&locks).await.unwrap();
    assert_eq!(details.len(), 2);

    assert_eq!(f.queue.cancel_all(&locks).await.unwrap(), 2);
    assert_eq!(f.queue.pending_count().await.unwrap(), 0);
    assert_eq!(f.store.get(QUEUE_INDEX_KEY).await.unwrap().as_deref(), Some("[]"));
}

impl Fixture {
    fn clock_now(&self) -> chrono::DateTime<chrono::Utc> {
        use crate::clock::Clock;
        self.clock.now()
    }
}
