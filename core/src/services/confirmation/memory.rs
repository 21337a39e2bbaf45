//! Scripted transport for tests and offline runs

use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::sync::Mutex;

use super::{ConfirmationTransport, TransportRequest, TransportResponse};

/// Replays queued responses in order, then falls back to a fixed one
pub struct StubConfirmationTransport {
    scripted: Mutex<VecDeque<Result<TransportResponse, String>>>,
    fallback: Mutex<Result<TransportResponse, String>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl StubConfirmationTransport {
    pub fn new() -> Self {
        Self::with_fallback(Ok(TransportResponse::confirmed()))
    }

    pub fn with_fallback(fallback: Result<TransportResponse, String>) -> Self {
        Self {
            scripted: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(fallback),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub async fn push(&self, response: Result<TransportResponse, String>) {
        self.scripted.lock().await.push_back(response);
    }

    pub async fn set_fallback(&self, response: Result<TransportResponse, String>) {
        *self.fallback.lock().await = response;
    }

    pub async fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

impl Default for StubConfirmationTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfirmationTransport for StubConfirmationTransport {
    async fn post_json(&self, request: &TransportRequest) -> Result<TransportResponse, String> {
        self.requests.lock().await.push(request.clone());
        match self.scripted.lock().await.pop_front() {
            Some(response) => response,
            None => self.fallback.lock().await.clone(),
        }
    }
}
