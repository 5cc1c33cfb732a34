//! Router-level tests driving the passport API over HTTP.
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use passport_lib::cache::{MemoryTtlStore, TtlStore};
use passport_lib::config::Settings;
use passport_lib::router::create_router;
use passport_lib::users::MemoryUserRepo;
use passport_lib::AppState;

const MOBILE: &str = "13800138000";

async fn test_app() -> (Router, Arc<MemoryTtlStore>) {
    let cache = Arc::new(MemoryTtlStore::new());
    let users = Arc::new(MemoryUserRepo::new());
    let state = AppState::new(
        Arc::clone(&cache) as Arc<dyn TtlStore>,
        users,
        Settings::default(),
    );
    (create_router(state), cache)
}

async fn seed_sms_code(cache: &MemoryTtlStore, mobile: &str, code: &str) {
    cache
        .set(
            &format!("sms_codes_{mobile}"),
            code,
            Duration::from_secs(300),
        )
        .await
        .unwrap();
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Extract the `name=token` pair from a `Set-Cookie` header
fn session_cookie(response: &axum::response::Response) -> String {
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie missing")
        .to_str()
        .unwrap();
    cookie
        .split(';')
        .next()
        .unwrap()
        .trim()
        .to_string()
}

#[tokio::test]
async fn register_login_check_logout_round_trip() {
    let (app, cache) = test_app().await;
    seed_sms_code(&cache, MOBILE, "1234").await;

    // Register
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1.0/users",
            json!({
                "mobile": MOBILE,
                "sms_code": "1234",
                "password": "pw1",
                "password2": "pw1",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response);
    let body = response_json(response).await;
    assert_eq!(body["errno"], "0");

    // The cookie authenticates the session check
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/v1.0/session")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = response_json(response).await;
    assert_eq!(body["errno"], "0");
    assert_eq!(body["data"]["name"], MOBILE);

    // Fresh login from a client without a cookie
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1.0/session",
            json!({ "mobile": MOBILE, "password": "pw1" }),
        ))
        .await
        .unwrap();
    let login_cookie = session_cookie(&response);
    let body = response_json(response).await;
    assert_eq!(body["errno"], "0");

    // Logout clears the session behind the login cookie
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/v1.0/session")
                .header(header::COOKIE, &login_cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = response_json(response).await;
    assert_eq!(body["errno"], "0");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/v1.0/session")
                .header(header::COOKIE, &login_cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = response_json(response).await;
    assert_eq!(body["errno"], "4101");
}

#[tokio::test]
async fn malformed_mobile_reports_param_error_with_http_200() {
    let (app, _cache) = test_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1.0/users",
            json!({
                "mobile": "16000000000",
                "sms_code": "1234",
                "password": "pw1",
                "password2": "pw1",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["errno"], "4103");
}

#[tokio::test]
async fn missing_fields_report_param_error() {
    let (app, _cache) = test_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1.0/session",
            json!({ "mobile": MOBILE }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["errno"], "4103");
}

#[tokio::test]
async fn bad_credentials_report_data_error() {
    let (app, cache) = test_app().await;
    seed_sms_code(&cache, MOBILE, "1234").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1.0/users",
            json!({
                "mobile": MOBILE,
                "sms_code": "1234",
                "password": "pw1",
                "password2": "pw1",
            }),
        ))
        .await
        .unwrap();
    let body = response_json(response).await;
    assert_eq!(body["errno"], "0");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1.0/session")
                .header(header::CONTENT_TYPE, "application/json")
                .header("x-real-ip", "1.2.3.4")
                .body(Body::from(
                    json!({ "mobile": MOBILE, "password": "wrong" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["errno"], "4004");
}

#[tokio::test]
async fn expired_sms_code_reports_no_data() {
    let (app, _cache) = test_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1.0/users",
            json!({
                "mobile": MOBILE,
                "sms_code": "1234",
                "password": "pw1",
                "password2": "pw1",
            }),
        ))
        .await
        .unwrap();
    let body = response_json(response).await;
    assert_eq!(body["errno"], "4002");
}

#[tokio::test]
async fn health_endpoint_is_live() {
    let (app, _cache) = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "ok");
}
