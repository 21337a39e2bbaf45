//! Port selection at startup

use mv_core::clock::{Clock, SystemClock};
use mv_core::repositories::{InMemoryEphemeralCache, InMemoryKeyValueStore, InMemoryProfileRepository};
use mv_core::services::ServicePorts;
use mv_shared::config::{AppConfig, CacheBackend};
use std::sync::Arc;
use tracing::{info, warn};

use crate::cache::{RedisClient, RedisEphemeralCache, RedisKeyValueStore, RedisProfileRepository};
use crate::http::ReqwestConfirmationTransport;
use crate::mail::create_mail_service;
use crate::InfrastructureError;

/// Everything the service needs, plus the Redis handle for health checks
pub struct Infrastructure {
    pub ports: ServicePorts,
    pub redis: Option<RedisClient>,
}

/// Build the ports selected by `cache.backend` and `mail.provider`
pub async fn build_ports(config: &AppConfig) -> Result<Infrastructure, InfrastructureError> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let mail = create_mail_service(&config.mail)?;
    let transport = Arc::new(ReqwestConfirmationTransport::new()?);

    match config.cache.backend {
        CacheBackend::Redis => {
            let redis = RedisClient::new(&config.cache).await?;
            info!(backend = "redis", "Storage ports ready");

            Ok(Infrastructure {
                ports: ServicePorts {
                    store: Arc::new(RedisKeyValueStore::new(redis.clone())),
                    cache: Arc::new(RedisEphemeralCache::new(redis.clone())),
                    profiles: Arc::new(RedisProfileRepository::new(redis.clone())),
                    mail,
                    transport,
                    clock,
                },
                redis: Some(redis),
            })
        }
        CacheBackend::Memory => {
            warn!(backend = "memory", "Using in-memory storage; state is lost on restart");

            Ok(Infrastructure {
                ports: ServicePorts {
                    store: Arc::new(InMemoryKeyValueStore::new()),
                    cache: Arc::new(InMemoryEphemeralCache::new(clock.clone())),
                    profiles: Arc::new(InMemoryProfileRepository::new()),
                    mail,
                    transport,
                    clock,
                },
                redis: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mv_core::repositories::KeyValueStore;
    use mv_shared::config::{MailConfig, MailProvider};

    #[tokio::test]
    async fn test_memory_backend_needs_no_redis() {
        let config = AppConfig::development();
        let infrastructure = build_ports(&config).await.unwrap();

        assert!(infrastructure.redis.is_none());
        infrastructure.ports.store.set("k", "v").await.unwrap();
        assert_eq!(
            infrastructure.ports.store.get("k").await.unwrap().as_deref(),
            Some("v")
        );
    }

    #[tokio::test]
    async fn test_misconfigured_mail_fails_startup() {
        let mut config = AppConfig::development();
        config.mail = MailConfig {
            provider: MailProvider::Http,
            ..Default::default()
        };

        assert!(matches!(
            build_ports(&config).await,
            Err(InfrastructureError::Config(_))
        ));
    }
}
