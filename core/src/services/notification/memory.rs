//! Mail transport that keeps messages in memory

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Mutex;

use super::MailService;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Default)]
pub struct RecordingMailService {
    sent: Mutex<Vec<SentMail>>,
    counter: AtomicU64,
    should_fail: AtomicBool,
}

impl RecordingMailService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    pub async fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().await.clone()
    }

    pub async fn last_to(&self, to: &str) -> Option<SentMail> {
        self.sent.lock().await.iter().rev().find(|m| m.to == to).cloned()
    }
}

#[async_trait]
impl MailService for RecordingMailService {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<String, String> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err("Mail transport unavailable".to_string());
        }
        self.sent.lock().await.push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        let id = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("recorded-{}", id))
    }
}
