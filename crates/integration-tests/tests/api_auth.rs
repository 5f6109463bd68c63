//! Health checks, bearer tokens and login validation.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use mise_core::EmployeeRole;
use mise_integration_tests::TestContext;
use serde_json::json;

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_is_ok_without_database() {
    let ctx = TestContext::new();
    let response = ctx.send(Method::GET, "/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_readiness_reports_unavailable_database() {
    let ctx = TestContext::new();
    let response = ctx.send(Method::GET, "/health/ready", None, None).await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_request_id_is_returned() {
    let ctx = TestContext::new();
    let response = ctx.send(Method::GET, "/health", None, None).await;
    assert!(response.headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_cors_preflight_for_configured_origin() {
    let ctx = TestContext::new();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/kitchen/waste")
        .header(header::ORIGIN, "https://ops.example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = ctx.send_request(request).await;
    assert_eq!(
        response
            .headers
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "https://ops.example.com"
    );
}

// =============================================================================
// Bearer tokens
// =============================================================================

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let ctx = TestContext::new();
    let response = ctx
        .send(Method::GET, "/api/kitchen/dashboard", None, None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.error().unwrap().contains("missing bearer token"));
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let ctx = TestContext::new();
    let response = ctx
        .send(Method::GET, "/api/settings", Some("not.a.token"), None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_non_bearer_scheme_is_unauthorized() {
    let ctx = TestContext::new();
    let request = Request::builder()
        .uri("/api/settings")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();
    let response = ctx.send_request(request).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_valid_token_reaches_handler() {
    let ctx = TestContext::new();
    let token = ctx.token(1, EmployeeRole::TeamMember);
    // Passes authentication, then fails on the unreachable database.
    let response = ctx
        .send(Method::GET, "/api/settings", Some(&token), None)
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.error(), Some("Internal server error"));
}

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_login_requires_fields() {
    let ctx = TestContext::new();
    let body = json!({ "email": " ", "password": "" });
    let response = ctx
        .send(Method::POST, "/api/auth/login", None, Some(&body))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_rejects_malformed_email() {
    let ctx = TestContext::new();
    let body = json!({ "email": "not-an-email", "password": "long enough" });
    let response = ctx
        .send(Method::POST, "/api/auth/login", None, Some(&body))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_rejects_malformed_json() {
    let ctx = TestContext::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header("x-forwarded-for", "203.0.113.11")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\":"))
        .unwrap();
    let response = ctx.send_request(request).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.error().is_some());
}
