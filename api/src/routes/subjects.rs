use actix_web::{web, HttpResponse};
use mv_shared::ApiResponse;
use validator::Validate;

use crate::app::AppState;
use crate::dto::{
    OtpRequest, OtpRequestedResponse, OtpVerifyRequest, OtpVerifyResponse,
    VeteranSubmissionRequest,
};
use crate::handlers::ApiResult;

use super::subject_id;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/subjects/{id}")
            .route("/status", web::get().to(get_status))
            .route("/veteran", web::post().to(submit_veteran))
            .route("/otp", web::post().to(request_otp))
            .route("/otp/verify", web::post().to(verify_otp)),
    );
}

/// GET /api/v1/subjects/{id}/status
pub async fn get_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = subject_id(&path)?;
    let status = state.service.get_status(&id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(status)))
}

/// POST /api/v1/subjects/{id}/veteran
///
/// 200 with `{"status": "approved" | "queued" | "denied", ...}`. A denial is a
/// normal outcome, not an error status.
pub async fn submit_veteran(
    state: web::Data<AppState>,
    path: web::Path<String>,
    request: web::Json<VeteranSubmissionRequest>,
) -> ApiResult<HttpResponse> {
    let id = subject_id(&path)?;
    request.validate()?;

    let outcome = state
        .service
        .submit_veteran_verification(&id, request.into_inner().fields)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(outcome)))
}

/// POST /api/v1/subjects/{id}/otp
pub async fn request_otp(
    state: web::Data<AppState>,
    path: web::Path<String>,
    request: web::Json<OtpRequest>,
) -> ApiResult<HttpResponse> {
    let id = subject_id(&path)?;
    request.validate()?;

    let receipt = state.service.request_otp(&id, &request.email).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(OtpRequestedResponse {
        message: "Verification code sent".to_string(),
        expires_in_seconds: receipt.expires_in_seconds,
    })))
}

/// POST /api/v1/subjects/{id}/otp/verify
///
/// A wrong code is `200` with `verified: false`; the lockout answers `429` once reached.
pub async fn verify_otp(
    state: web::Data<AppState>,
    path: web::Path<String>,
    request: web::Json<OtpVerifyRequest>,
) -> ApiResult<HttpResponse> {
    let id = subject_id(&path)?;
    request.validate()?;

    let outcome = state.service.verify_otp(&id, &request.code).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(OtpVerifyResponse::from(outcome))))
}
