use actix_web::{web, HttpResponse};
use mv_shared::types::HealthResponse;

use crate::app::AppState;

/// Liveness plus a Redis ping when that backend is active
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let healthy = match &state.redis {
        Some(redis) => matches!(redis.health_check().await, Ok(true)),
        None => true,
    };

    let mut body = HealthResponse::healthy("milverify-api", env!("CARGO_PKG_VERSION"));
    if healthy {
        HttpResponse::Ok().json(body)
    } else {
        body.status = String::from("degraded");
        HttpResponse::ServiceUnavailable().json(body)
    }
}
