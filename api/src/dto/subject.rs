use mv_core::domain::entities::OtpVerifyOutcome;
use mv_core::FormPayload;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

const MAX_FORM_FIELDS: usize = 32;
const MAX_FIELD_LEN: usize = 256;

/// Raw form fields; the core decides which ones it forwards
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VeteranSubmissionRequest {
    #[serde(flatten)]
    #[validate(custom = "validate_form_fields")]
    pub fields: FormPayload,
}

fn validate_form_fields(fields: &FormPayload) -> Result<(), ValidationError> {
    if fields.len() > MAX_FORM_FIELDS {
        return Err(ValidationError::new("too_many_fields"));
    }
    if fields
        .iter()
        .any(|(key, value)| key.len() > MAX_FIELD_LEN || value.len() > MAX_FIELD_LEN)
    {
        return Err(ValidationError::new("field_too_long"));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OtpRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpRequestedResponse {
    pub message: String,
    pub expires_in_seconds: i64,
}

/// Wrong-length codes still reach the engine so they count as failed attempts
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OtpVerifyRequest {
    #[validate(length(max = 32))]
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpVerifyResponse {
    pub status: OtpVerifyOutcome,
    pub verified: bool,
}

impl From<OtpVerifyOutcome> for OtpVerifyResponse {
    fn from(status: OtpVerifyOutcome) -> Self {
        Self {
            verified: status == OtpVerifyOutcome::Approved,
            status,
        }
    }
}
