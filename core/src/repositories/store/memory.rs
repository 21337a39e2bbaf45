//! Process-local implementation of KeyValueStore.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use super::KeyValueStore;

pub struct InMemoryKeyValueStore {
    values: RwLock<HashMap<String, String>>,
    should_fail: AtomicBool,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
            should_fail: AtomicBool::new(false),
        }
    }

    /// Make every subsequent operation fail
    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    pub async fn keys(&self) -> Vec<String> {
        self.values.read().await.keys().cloned().collect()
    }

    fn check(&self) -> Result<(), String> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err("In-memory store unavailable".to_string());
        }
        Ok(())
    }
}

impl Default for InMemoryKeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, String> {
        self.check()?;
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), String> {
        self.check()?;
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, String> {
        self.check()?;
        Ok(self.values.write().await.remove(key).is_some())
    }
}
