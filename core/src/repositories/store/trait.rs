use async_trait::async_trait;

/// Durable get/set/delete storage.
///
/// Implementations must give read-after-write consistency within one process.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, String>;

    async fn set(&self, key: &str, value: &str) -> Result<(), String>;

    /// Returns whether a value was removed
    async fn delete(&self, key: &str) -> Result<bool, String>;
}
