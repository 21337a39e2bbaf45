//! Domain-specific error types and error handling.

mod types;

#[cfg(test)]
mod tests;

pub use types::{ErrorKind, ValidationError};

use thiserror::Error;

/// Discriminated failure returned by every core operation
#[derive(Error, Debug)]
pub enum DomainError {
    /// Missing or unusable configuration; never retried automatically
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Too many failed {verification_type} verification attempts. Please try again in {remaining_minutes} minutes")]
    LockedOut {
        verification_type: String,
        remaining_minutes: i64,
    },

    #[error("Please wait {remaining_seconds} seconds before requesting a new code")]
    CooldownActive { remaining_seconds: i64 },

    #[error("Business rule violation: {message}")]
    BusinessRule { message: String },

    /// External failure that the retry queue may absorb
    #[error("Transient external error: {message}")]
    Transient { message: String },

    #[error("Verification denied: {reason}")]
    PermanentDenial { reason: String },

    /// Stored data failed to decrypt or deserialize
    #[error("Stored data is corrupted: {message}")]
    DataCorruption { message: String },

    /// Mail transport failure; distinct from validation so it never consumes an attempt
    #[error("Message delivery failed: {message}")]
    Delivery { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Configuration { .. } => ErrorKind::Configuration,
            DomainError::Validation(_) => ErrorKind::Validation,
            DomainError::LockedOut { .. } | DomainError::CooldownActive { .. } => {
                ErrorKind::RateLimited
            }
            DomainError::BusinessRule { .. } => ErrorKind::BusinessRule,
            DomainError::Transient { .. } => ErrorKind::Transient,
            DomainError::PermanentDenial { .. } => ErrorKind::PermanentDenial,
            DomainError::DataCorruption { .. } => ErrorKind::DataCorruption,
            DomainError::Delivery { .. } => ErrorKind::Delivery,
            DomainError::Storage { .. } => ErrorKind::Storage,
            DomainError::NotFound { .. } => ErrorKind::NotFound,
            DomainError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Stable code for transports
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Configuration { .. } => "CONFIGURATION_ERROR",
            DomainError::Validation(err) => err.code(),
            DomainError::LockedOut { .. } => "LOCKED_OUT",
            DomainError::CooldownActive { .. } => "COOLDOWN_ACTIVE",
            DomainError::BusinessRule { .. } => "CONFLICT",
            DomainError::Transient { .. } => "TRANSIENT_ERROR",
            DomainError::PermanentDenial { .. } => "VERIFICATION_DENIED",
            DomainError::DataCorruption { .. } => "DATA_CORRUPTED",
            DomainError::Delivery { .. } => "DELIVERY_FAILED",
            DomainError::Storage { .. } => "STORAGE_ERROR",
            DomainError::NotFound { .. } => "NOT_FOUND",
            DomainError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        DomainError::Configuration {
            message: message.into(),
        }
    }

    pub fn business_rule(message: impl Into<String>) -> Self {
        DomainError::BusinessRule {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        DomainError::Storage {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        DomainError::Internal {
            message: message.into(),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
