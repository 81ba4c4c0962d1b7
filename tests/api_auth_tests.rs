// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API authentication and CORS tests.
//!
//! These tests verify that:
//! 1. Protected routes reject requests without a session
//! 2. Signup and login mint working session cookies
//! 3. The session probe degrades to "not logged in" instead of erroring

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn test_protected_route_without_session() {
    let (app, _, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/races")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_with_invalid_token() {
    let (app, _, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/races")
                .header(header::AUTHORIZATION, "Bearer invalid.token.here")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signup_then_me() {
    let (app, _, _) = common::create_test_app();
    let cookie = common::signup_user(&app, "runner@example.com", "Runner").await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/me")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let user = common::body_json(response).await;
    assert_eq!(user["email"], "runner@example.com");
    assert_eq!(user["name"], "Runner");
}

#[tokio::test]
async fn test_signup_duplicate_email_rejected() {
    let (app, _, _) = common::create_test_app();
    common::signup_user(&app, "runner@example.com", "Runner").await;

    let payload = json!({
        "name": "Runner Again",
        "email": "runner@example.com",
        "password": "hunter22",
        "confirmPassword": "hunter22",
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/signup")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "backend_error");
    assert_eq!(body["details"], "User already registered");
}

#[tokio::test]
async fn test_login_wrong_password() {
    let (app, _, _) = common::create_test_app();
    common::signup_user(&app, "runner@example.com", "Runner").await;

    let payload = json!({
        "email": "runner@example.com",
        "password": "wrong-password",
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await;
    assert_eq!(body["details"], "Invalid login credentials");
}

#[tokio::test]
async fn test_login_validation_reports_fields() {
    let (app, _, _) = common::create_test_app();

    let payload = json!({
        "email": "not-an-email",
        "password": "",
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "validation_failed");
    assert_eq!(body["fields"]["email"][0], "Enter a valid email");
    assert_eq!(body["fields"]["password"][0], "Password is required");
}

#[tokio::test]
async fn test_login_after_logout() {
    let (app, _, _) = common::create_test_app();
    let cookie = common::signup_user(&app, "runner@example.com", "Runner").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/logout")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The registry entry is gone; the old cookie no longer works
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/me")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let payload = json!({
        "email": "runner@example.com",
        "password": "hunter22",
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["user"]["email"], "runner@example.com");
}

#[tokio::test]
async fn test_session_probe_without_cookie() {
    let (app, _, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/auth/session")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["authenticated"], false);
    assert!(body.get("user").is_none());
}

#[tokio::test]
async fn test_session_probe_with_live_session() {
    let (app, _, _) = common::create_test_app();
    let cookie = common::signup_user(&app, "runner@example.com", "Runner").await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/auth/session")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["user"]["email"], "runner@example.com");
}

#[tokio::test]
async fn test_session_probe_degrades_when_backend_fails() {
    let (app, _, backend) = common::create_test_app();
    let cookie = common::signup_user(&app, "runner@example.com", "Runner").await;

    backend.set_failure("Session expired").await;

    // The probe answers "not logged in" rather than an error status
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/auth/session")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["authenticated"], false);

    // And the dead session was evicted: the cookie is now useless even
    // after the backend recovers
    backend.clear_failure().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/me")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cookie_does_not_survive_restart() {
    let (app, _, _) = common::create_test_app();
    let cookie = common::signup_user(&app, "runner@example.com", "Runner").await;

    // A fresh app shares the signing key but not the session registry,
    // like a restarted process
    let (restarted, _, _) = common::create_test_app();

    let response = restarted
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/me")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_forgot_password_is_public() {
    let (app, _, _) = common::create_test_app();
    common::signup_user(&app, "runner@example.com", "Runner").await;

    let payload = json!({ "email": "runner@example.com" });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/forgot-password")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["message"], "Check your email for a reset link.");
}

#[tokio::test]
async fn test_cors_preflight() {
    let (app, _, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/races")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // OPTIONS should return 200 (CORS preflight success)
    assert_eq!(response.status(), StatusCode::OK);

    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}

#[tokio::test]
async fn test_public_route_no_auth_required() {
    let (app, _, _) = common::create_test_app();

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

    // Health should be accessible without auth
    assert_eq!(response.status(), StatusCode::OK);
}
