//! Application state and factory

use actix_web::{web, HttpResponse};
use mv_core::VerificationService;
use mv_infra::cache::RedisClient;
use mv_shared::{error_codes, ErrorResponse};
use std::sync::Arc;

use crate::handlers::health::health_check;
use crate::routes::{admin, subjects};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<VerificationService>,
    /// Present when the Redis backend is active; pinged by `/health`
    pub redis: Option<RedisClient>,
    pub admin_token: String,
}

impl AppState {
    pub fn new(service: Arc<VerificationService>, admin_token: impl Into<String>) -> Self {
        Self {
            service,
            redis: None,
            admin_token: admin_token.into(),
        }
    }

    pub fn with_redis(mut self, redis: Option<RedisClient>) -> Self {
        self.redis = redis;
        self
    }
}

/// Route table and extractor configuration, shared by the server and the tests
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/api/v1")
                .configure(subjects::configure)
                .service(web::scope("/admin").configure(admin::configure)),
        )
        .default_service(web::route().to(not_found));
}

/// Malformed JSON bodies get the standard error envelope
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(16 * 1024)
        .error_handler(|err, _req| {
            let response = HttpResponse::BadRequest().json(ErrorResponse::new(
                error_codes::BAD_REQUEST,
                err.to_string(),
            ));
            actix_web::error::InternalError::from_response(err, response).into()
        })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(ErrorResponse::new(
            error_codes::BAD_REQUEST,
            err.to_string(),
        ));
        actix_web::error::InternalError::from_response(err, response).into()
    })
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
