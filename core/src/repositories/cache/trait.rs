use async_trait::async_trait;

/// TTL cache for OTP codes and cooldown stamps
#[async_trait]
pub trait EphemeralCache: Send + Sync {
    async fn set_with_ttl(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), String>;

    /// Expired entries read as absent
    async fn get(&self, key: &str) -> Result<Option<String>, String>;

    async fn delete(&self, key: &str) -> Result<(), String>;
}
