//! Process-local implementation of EphemeralCache.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::EphemeralCache;
use crate::clock::Clock;

/// TTL map whose expiry follows the injected clock
pub struct InMemoryEphemeralCache {
    entries: Mutex<HashMap<String, (String, DateTime<Utc>)>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryEphemeralCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }
}

#[async_trait]
impl EphemeralCache for InMemoryEphemeralCache {
    async fn set_with_ttl(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), String> {
        let ttl = i64::try_from(ttl_seconds).map_err(|_| format!("TTL too large: {}", ttl_seconds))?;
        let expires_at = self.clock.now() + Duration::seconds(ttl);
        self.entries
            .lock()
            .await
            .insert(key.to_string(), (value.to_string(), expires_at));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, String> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some((_, expires_at)) if now >= *expires_at => {
                entries.remove(key);
                Ok(None)
            }
            Some((value, _)) => Ok(Some(value.clone())),
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), String> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}
