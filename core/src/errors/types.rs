//! Error classification and validation failures

use serde::Serialize;
use thiserror::Error;

/// Machine-readable category of a [`super::DomainError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    Validation,
    RateLimited,
    BusinessRule,
    Transient,
    PermanentDenial,
    DataCorruption,
    Delivery,
    Storage,
    NotFound,
    Internal,
}

impl ErrorKind {
    /// Whether an automated process may try the same operation again
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Transient | ErrorKind::Storage)
    }
}

/// Input rejected before any state mutation or external call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredField { field: String },

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("This email address is not eligible for military verification")]
    IneligibleEmail,

    #[error("Email address does not match the name on the account")]
    NameMismatch,

    #[error("Invalid format for {field}: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::RequiredField {
            field: field.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::RequiredField { .. } => "REQUIRED_FIELD",
            ValidationError::InvalidEmail => "INVALID_EMAIL",
            ValidationError::IneligibleEmail => "EMAIL_NOT_ELIGIBLE",
            ValidationError::NameMismatch => "NAME_MISMATCH",
            ValidationError::InvalidFormat { .. } => "INVALID_FORMAT",
        }
    }
}
