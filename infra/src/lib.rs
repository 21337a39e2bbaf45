//! # Infrastructure Layer
//!
//! Concrete implementations of the ports declared by `mv_core`:
//! - **Cache**: Redis-backed durable store, TTL cache and profile repository
//! - **Http**: reqwest transport for the veteran confirmation API
//! - **Mail**: HTTP mail relay with retry, plus a log-only sender for development
//! - **Config**: layered configuration loading
//!
//! [`build_ports`] selects Redis or in-memory storage from configuration and
//! returns everything `VerificationService::new` needs.

pub mod cache;
pub mod config;
pub mod http;
pub mod mail;
pub mod wiring;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{load_config, load_config_from};
pub use wiring::{build_ports, Infrastructure};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Mail delivery error
    #[error("Mail service error: {0}")]
    Mail(String),

    /// Stored value could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

impl From<::config::ConfigError> for InfrastructureError {
    fn from(error: ::config::ConfigError) -> Self {
        InfrastructureError::Config(error.to_string())
    }
}
