//! Subject-facing routes: status, veteran submission and the military OTP round trip

#[macro_use]
mod common;

use actix_web::{http::StatusCode, test};
use chrono::Duration;
use mv_core::domain::entities::OTP_COOLDOWN_SECONDS;
use mv_core::services::confirmation::TransportResponse;
use serde_json::{json, Value};

use common::{veteran_form, TestApp};

const EMAIL: &str = "tamara.ellis@army.mil";

#[actix_web::test]
async fn test_health_reports_healthy_without_redis() {
    let t = TestApp::new();
    let app = init_app!(t);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "milverify-api");
}

#[actix_web::test]
async fn test_unknown_route_uses_error_envelope() {
    let t = TestApp::new();
    let app = init_app!(t);

    let req = test::TestRequest::get().uri("/api/v1/nowhere").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "NOT_FOUND");
}

#[actix_web::test]
async fn test_fresh_subject_has_no_status() {
    let t = TestApp::new();
    let app = init_app!(t);

    let req = test::TestRequest::get().uri("/api/v1/subjects/42/status").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["is_veteran"], false);
    assert_eq!(body["data"]["is_military"], false);
    assert_eq!(body["data"]["has_pending"], false);
}

#[actix_web::test]
async fn test_confirmed_submission_is_approved() {
    let t = TestApp::new();
    let app = init_app!(t);
    t.transport.push(Ok(TransportResponse::confirmed())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/subjects/42/veteran")
        .set_json(veteran_form())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["status"], "approved");

    let req = test::TestRequest::get().uri("/api/v1/subjects/42/status").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["is_veteran"], true);
    assert!(body["data"]["veteran_expires_at"].is_string());

    let sent = t.transport.requests().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].body["firstName"], "Tamara");
}

#[actix_web::test]
async fn test_upstream_error_is_queued() {
    let t = TestApp::new();
    let app = init_app!(t);
    t.transport.push(Ok(TransportResponse::not_confirmed("ERROR"))).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/subjects/42/veteran")
        .set_json(veteran_form())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["status"], "queued");

    let req = test::TestRequest::get().uri("/api/v1/subjects/42/status").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["has_pending"], true);
    assert_eq!(body["data"]["is_veteran"], false);
}

#[actix_web::test]
async fn test_permanent_denial_is_a_normal_outcome() {
    let t = TestApp::new();
    let app = init_app!(t);
    t.transport.push(Ok(TransportResponse::not_confirmed("NOT_TITLE_38"))).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/subjects/42/veteran")
        .set_json(veteran_form())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["status"], "denied");
    assert_eq!(body["data"]["reason"], "NOT_TITLE_38");
    assert!(body["data"]["message"].as_str().is_some_and(|m| !m.is_empty()));
}

#[actix_web::test]
async fn test_oversized_form_is_rejected_before_the_core() {
    let t = TestApp::new();
    let app = init_app!(t);

    let mut form = veteran_form();
    form["firstName"] = json!("x".repeat(300));
    let req = test::TestRequest::post()
        .uri("/api/v1/subjects/42/veteran")
        .set_json(form)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert_eq!(t.transport.call_count().await, 0);
}

#[actix_web::test]
async fn test_malformed_json_is_bad_request() {
    let t = TestApp::new();
    let app = init_app!(t);

    let req = test::TestRequest::post()
        .uri("/api/v1/subjects/42/otp")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "BAD_REQUEST");
}

#[actix_web::test]
async fn test_otp_round_trip() {
    let t = TestApp::new();
    let app = init_app!(t);

    let req = test::TestRequest::post()
        .uri("/api/v1/subjects/7/otp")
        .set_json(json!({ "email": EMAIL }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["expires_in_seconds"], 15 * 60);

    let code = t.sent_code(EMAIL).await;
    let wrong = if code == "000000" { "111111" } else { "000000" };

    let req = test::TestRequest::post()
        .uri("/api/v1/subjects/7/otp/verify")
        .set_json(json!({ "code": wrong }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["verified"], false);
    assert_eq!(body["data"]["status"], "invalid");

    let req = test::TestRequest::post()
        .uri("/api/v1/subjects/7/otp/verify")
        .set_json(json!({ "code": code }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["verified"], true);

    let req = test::TestRequest::get().uri("/api/v1/subjects/7/status").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["is_military"], true);
}

#[actix_web::test]
async fn test_otp_cooldown_is_429_with_remaining_seconds() {
    let t = TestApp::new();
    let app = init_app!(t);

    let request = || {
        test::TestRequest::post()
            .uri("/api/v1/subjects/7/otp")
            .set_json(json!({ "email": EMAIL }))
            .to_request()
    };
    let resp = test::call_service(&app, request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    t.clock.advance(Duration::seconds(15));
    let resp = test::call_service(&app, request()).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "COOLDOWN_ACTIVE");
    assert_eq!(body["details"]["remaining_seconds"], OTP_COOLDOWN_SECONDS - 15);

    assert_eq!(t.mail.sent().await.len(), 1);
}

#[actix_web::test]
async fn test_ineligible_email_is_rejected() {
    let t = TestApp::new();
    let app = init_app!(t);

    let req = test::TestRequest::post()
        .uri("/api/v1/subjects/7/otp")
        .set_json(json!({ "email": "tamara@gmail.com" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["details"]["reason"], "EMAIL_NOT_ELIGIBLE");
    assert!(t.mail.sent().await.is_empty());
}

#[actix_web::test]
async fn test_repeated_wrong_codes_lock_the_subject_out() {
    let t = TestApp::new();
    let app = init_app!(t);

    let req = test::TestRequest::post()
        .uri("/api/v1/subjects/7/otp")
        .set_json(json!({ "email": EMAIL }))
        .to_request();
    test::call_service(&app, req).await;
    let code = t.sent_code(EMAIL).await;
    let wrong = if code == "000000" { "111111" } else { "000000" };

    let mut last = StatusCode::OK;
    for _ in 0..10 {
        let req = test::TestRequest::post()
            .uri("/api/v1/subjects/7/otp/verify")
            .set_json(json!({ "code": wrong }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        last = resp.status();
        if last == StatusCode::TOO_MANY_REQUESTS {
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["error"], "LOCKED_OUT");
            assert_eq!(body["details"]["verification_type"], "military");
            assert!(body["details"]["remaining_minutes"].as_i64().unwrap() > 0);
            break;
        }
    }
    assert_eq!(last, StatusCode::TOO_MANY_REQUESTS);
}
