//! Route handlers
//!
//! - `subjects` - status, veteran submission and the military OTP round trip
//! - `admin` - overrides, queue management, audit log and diagnostics

pub mod admin;
pub mod subjects;

use mv_core::{DomainError, ValidationError, VerificationType};

const MAX_SUBJECT_ID_LEN: usize = 128;

/// Path segment checks shared by both route groups
pub(crate) fn subject_id(raw: &str) -> Result<String, DomainError> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(ValidationError::required("subject_id").into());
    }
    if id.len() > MAX_SUBJECT_ID_LEN {
        return Err(ValidationError::InvalidFormat {
            field: "subject_id".to_string(),
            reason: "too long".to_string(),
        }
        .into());
    }
    Ok(id.to_string())
}

pub(crate) fn verification_type(raw: &str) -> Result<VerificationType, DomainError> {
    VerificationType::from_str(raw).ok_or_else(|| {
        ValidationError::InvalidFormat {
            field: "verification_type".to_string(),
            reason: "expected 'veteran' or 'military'".to_string(),
        }
        .into()
    })
}
