mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use backoffice_api::{
    app::build_app,
    dto::auth::PrincipalKind,
    services::token_service,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

fn app() -> (Router, backoffice_api::state::AppState) {
    let state = common::lazy_state();
    let app = build_app(state.clone()).expect("app builds");
    (app, state)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

fn assert_error_envelope(body: &Value) {
    assert_eq!(body["success"], Value::Bool(false));
    assert!(body["message"].is_string());
    assert!(body["data"]["error"].is_string());
}

#[tokio::test]
async fn health_route_is_public() {
    let (app, _) = app();
    let (status, body) = send(app, get("/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], Value::Bool(true));
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn unknown_route_uses_error_envelope() {
    let (app, _) = app();
    let (status, body) = send(app, get("/api/nope", None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error_envelope(&body);
}

#[tokio::test]
async fn missing_bearer_token_is_rejected() {
    for uri in ["/api/cart", "/api/transactions", "/api/auth/me", "/api/admin/users"] {
        let (app, _) = app();
        let (status, body) = send(app, get(uri, None)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_error_envelope(&body);
    }
}

#[tokio::test]
async fn garbage_bearer_token_is_rejected() {
    let (app, _) = app();
    let (status, body) = send(app, get("/api/wishlist", Some("not-a-jwt"))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error_envelope(&body);
}

#[tokio::test]
async fn customer_token_is_forbidden_on_admin_routes() {
    let (app, state) = app();
    let pair = token_service::issue_pair(&state.config, Uuid::new_v4(), PrincipalKind::Customer)
        .expect("token");

    let (status, body) = send(app, get("/api/admin/transactions", Some(&pair.access_token))).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_error_envelope(&body);
}

#[tokio::test]
async fn admin_token_is_forbidden_on_customer_routes() {
    let (app, state) = app();
    let pair = token_service::issue_pair(&state.config, Uuid::new_v4(), PrincipalKind::Admin)
        .expect("token");

    let (status, body) = send(app, get("/api/cart", Some(&pair.access_token))).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_error_envelope(&body);
}

#[tokio::test]
async fn refresh_token_cannot_be_used_as_access_token() {
    let (app, state) = app();
    let pair = token_service::issue_pair(&state.config, Uuid::new_v4(), PrincipalKind::Customer)
        .expect("token");

    let (status, _) = send(app, get("/api/cart", Some(&pair.refresh_token))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let (app, _) = app();
    let response = app.oneshot(get("/health", None)).await.expect("response");

    assert!(response.headers().contains_key("x-request-id"));
}
