//! Shared utilities and common types for the MilVerify server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types, including the verification settings surface
//! - Error and response structures for the HTTP layer
//! - Utility functions (email validation)

pub mod config;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheBackend, CacheConfig, EncryptionConfig, Environment, LogFormat,
    LoggingConfig, MailConfig, MailProvider, ServerConfig, VerificationSettings,
};
pub use errors::{error_codes, ErrorResponse};
pub use types::ApiResponse;
pub use utils::validation;
