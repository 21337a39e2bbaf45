//! Bearer-token guard for the admin routes

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use constant_time_eq::constant_time_eq;
use std::future::{ready, Ready};

use crate::app::AppState;
use crate::handlers::ApiError;

/// Extracting this proves the request carried the configured admin token
#[derive(Debug, Clone, Copy)]
pub struct AdminAuth;

impl FromRequest for AdminAuth {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authorize(req))
    }
}

fn authorize(req: &HttpRequest) -> Result<AdminAuth, ApiError> {
    let expected = req
        .app_data::<web::Data<AppState>>()
        .map(|state| state.admin_token.trim())
        .filter(|token| !token.is_empty())
        .ok_or(ApiError::AdminDisabled)?;

    let presented = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or(ApiError::Unauthorized)?;

    if constant_time_eq(presented.as_bytes(), expected.as_bytes()) {
        Ok(AdminAuth)
    } else {
        tracing::warn!(path = %req.path(), "Rejected admin request with invalid token");
        Err(ApiError::Unauthorized)
    }
}
