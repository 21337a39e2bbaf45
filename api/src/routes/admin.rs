//! Administrative surface. Every handler requires [`AdminAuth`].

use actix_web::{http::header, web, HttpResponse};
use mv_shared::ApiResponse;
use serde_json::json;
use validator::Validate;

use crate::app::AppState;
use crate::dto::{
    ContactRequest, LogsQuery, PendingCancelledResponse, PendingRecordSummary, SetVerifiedRequest,
};
use crate::handlers::{AdminAuth, ApiResult};

use super::{subject_id, verification_type};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/subjects/{id}/verified", web::put().to(set_verified))
        .route("/subjects/{id}/contact", web::put().to(update_contact))
        .route("/subjects/{id}/pending", web::delete().to(cancel_pending))
        .route("/subjects/{id}/lockout/{type}", web::delete().to(unlock))
        .route("/pending", web::get().to(list_pending))
        .route("/pending", web::delete().to(cancel_all_pending))
        .route("/sweep", web::post().to(run_sweep))
        .route("/logs", web::get().to(get_logs))
        .route("/logs", web::delete().to(clear_logs))
        .route("/logs/export", web::get().to(export_logs))
        .route("/test-connection", web::post().to(test_connection))
        .route("/encryption/self-test", web::get().to(encryption_self_test));
}

pub async fn set_verified(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    path: web::Path<String>,
    request: web::Json<SetVerifiedRequest>,
) -> ApiResult<HttpResponse> {
    let id = subject_id(&path)?;
    state
        .service
        .set_verified(&id, request.verification_type, request.verified)
        .await?;

    let status = state.service.get_status(&id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(status)))
}

pub async fn update_contact(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    path: web::Path<String>,
    request: web::Json<ContactRequest>,
) -> ApiResult<HttpResponse> {
    let id = subject_id(&path)?;
    request.validate()?;

    state
        .service
        .update_contact(&id, request.into_inner().into())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn cancel_pending(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = subject_id(&path)?;
    let removed = state.service.cancel_pending(&id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(PendingCancelledResponse {
        removed: usize::from(removed),
    })))
}

pub async fn cancel_all_pending(
    _admin: AdminAuth,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let removed = state.service.cancel_all_pending().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(PendingCancelledResponse { removed })))
}

pub async fn unlock(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (raw_id, raw_type) = path.into_inner();
    let id = subject_id(&raw_id)?;
    let verification_type = verification_type(&raw_type)?;

    state.service.unlock(&id, verification_type).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn list_pending(
    _admin: AdminAuth,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let records: Vec<PendingRecordSummary> = state
        .service
        .pending_details()
        .await?
        .into_iter()
        .map(PendingRecordSummary::from)
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(json!({
        "count": records.len(),
        "records": records,
    }))))
}

/// Drain the queue now, waiting for any scheduled sweep in progress
pub async fn run_sweep(_admin: AdminAuth, state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let report = state.service.run_manual_sweep().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(report)))
}

pub async fn get_logs(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    query: web::Query<LogsQuery>,
) -> ApiResult<HttpResponse> {
    query.validate()?;
    let audit = state.service.audit();
    let limit = query.limit();

    let mut entries = match (&query.subject_id, query.status) {
        (Some(subject), _) => audit.logs_for_subject(subject, limit).await?,
        (None, Some(status)) => audit.logs_by_status(status, limit).await?,
        (None, None) => audit.get_logs(limit).await?,
    };
    if let (Some(_), Some(status)) = (&query.subject_id, query.status) {
        entries.retain(|entry| entry.status == status);
    }
    let total = audit.log_count().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(json!({
        "total": total,
        "entries": entries,
    }))))
}

pub async fn clear_logs(_admin: AdminAuth, state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    state.service.audit().clear().await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn export_logs(_admin: AdminAuth, state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let body = state.service.audit().export_json().await?;
    Ok(HttpResponse::Ok()
        .content_type("application/json")
        .insert_header((
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"milverify-audit-log.json\"",
        ))
        .body(body))
}

pub async fn test_connection(
    _admin: AdminAuth,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let result = state.service.test_connection().await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(result)))
}

pub async fn encryption_self_test(
    _admin: AdminAuth,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let status = state.service.encryption_status().await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(status)))
}
