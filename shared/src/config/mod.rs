//! Configuration module
//!
//! - `cache` - storage backend selection and Redis connection
//! - `environment` - environment detection and logging configuration
//! - `mail` - outbound mail transport
//! - `security` - payload encryption key material
//! - `server` - HTTP server binding
//! - `verification` - the settings surface consumed by the verification core

pub mod cache;
pub mod environment;
pub mod mail;
pub mod security;
pub mod server;
pub mod verification;

use serde::{Deserialize, Serialize};

pub use cache::{CacheBackend, CacheConfig};
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use mail::{MailConfig, MailProvider};
pub use security::EncryptionConfig;
pub use server::ServerConfig;
pub use verification::{
    AuditSettings, GeneralSettings, MilitaryOtpSettings, NameMatchMode, QueueSettings,
    SecuritySettings, VaApiSettings, VerificationSettings,
};

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub environment: Environment,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub mail: MailConfig,

    #[serde(default)]
    pub encryption: EncryptionConfig,

    #[serde(default)]
    pub verification: VerificationSettings,
}

impl AppConfig {
    /// Create configuration for development environment
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            cache: CacheConfig::memory(),
            logging: LoggingConfig::for_environment(Environment::Development),
            ..Default::default()
        }
    }

    /// Create configuration for production environment
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig::new("0.0.0.0", 8080),
            cache: CacheConfig::default(),
            logging: LoggingConfig::for_environment(Environment::Production),
            mail: MailConfig {
                provider: MailProvider::Http,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Settings that must never reach production unnoticed
    pub fn unsafe_settings(&self) -> Vec<&'static str> {
        let mut warnings = Vec::new();
        if self.verification.general.disable_encryption {
            warnings.push("verification.general.disable_encryption");
        }
        if self.environment.is_production() && self.verification.va_api.sandbox {
            warnings.push("verification.va_api.sandbox");
        }
        if self.server.admin_token.trim().is_empty() {
            warnings.push("server.admin_token");
        }
        warnings
    }
}
