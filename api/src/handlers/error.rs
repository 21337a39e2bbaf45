//! Domain error to HTTP response mapping

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use mv_core::{DomainError, ErrorKind};
use mv_shared::{error_codes, ErrorResponse};
use validator::ValidationErrors;

/// Error returned by every handler
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Invalid request")]
    InvalidRequest(#[from] ValidationErrors),

    #[error("Admin authentication required")]
    Unauthorized,

    #[error("Admin API is not configured")]
    AdminDisabled,
}

pub type ApiResult<T> = Result<T, ApiError>;

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Configuration => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::BusinessRule => StatusCode::CONFLICT,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Delivery => StatusCode::BAD_GATEWAY,
        ErrorKind::Transient => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn domain_body(error: &DomainError) -> ErrorResponse {
    match error {
        DomainError::LockedOut {
            verification_type,
            remaining_minutes,
        } => ErrorResponse::new(error.code(), error.to_string())
            .with_detail("verification_type", verification_type.clone())
            .with_detail("remaining_minutes", *remaining_minutes),
        DomainError::CooldownActive { remaining_seconds } => {
            ErrorResponse::new(error.code(), error.to_string())
                .with_detail("remaining_seconds", *remaining_seconds)
        }
        DomainError::Validation(validation) => {
            ErrorResponse::new(error_codes::VALIDATION_ERROR, error.to_string())
                .with_detail("reason", validation.code())
        }
        // Storage, corruption and internal messages stay in the log
        _ if status_for(error.kind()) == StatusCode::INTERNAL_SERVER_ERROR => {
            ErrorResponse::new(error.code(), "An internal error occurred")
        }
        _ => ErrorResponse::new(error.code(), error.to_string()),
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Domain(error) => status_for(error.kind()),
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::AdminDisabled => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = match self {
            ApiError::Domain(error) => {
                if status.is_server_error() {
                    tracing::error!(error = %error, code = error.code(), "Request failed");
                } else {
                    tracing::debug!(error = %error, code = error.code(), "Request rejected");
                }
                domain_body(error)
            }
            ApiError::InvalidRequest(errors) => {
                let fields: Vec<&str> = errors.field_errors().keys().copied().collect();
                ErrorResponse::new(error_codes::VALIDATION_ERROR, "Invalid request")
                    .with_detail("fields", fields)
            }
            ApiError::Unauthorized => {
                ErrorResponse::new(error_codes::UNAUTHORIZED, self.to_string())
            }
            ApiError::AdminDisabled => {
                ErrorResponse::new(error_codes::CONFIGURATION_ERROR, self.to_string())
            }
        };

        HttpResponse::build(status).json(body)
    }
}
