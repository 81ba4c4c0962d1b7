// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use racetrack::backend::{InMemoryBackend, RaceBackend};
use racetrack::config::Config;
use racetrack::routes::create_router;
use racetrack::stores::SessionRegistry;
use racetrack::AppState;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

/// Create a test app over the in-memory backend.
/// Returns the router, the shared state, and the backend for direct control.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, Arc<InMemoryBackend>) {
    create_test_app_with_frontend_url("http://localhost:5173")
}

/// Same as [`create_test_app`] but with a chosen frontend URL, for
/// exercising the cookie Secure flag and CORS origins.
#[allow(dead_code)]
pub fn create_test_app_with_frontend_url(
    frontend_url: &str,
) -> (axum::Router, Arc<AppState>, Arc<InMemoryBackend>) {
    let mut config = Config::test_default();
    config.frontend_url = frontend_url.to_string();

    let backend = Arc::new(InMemoryBackend::new());
    let state = Arc::new(AppState {
        config,
        backend: backend.clone() as Arc<dyn RaceBackend>,
        sessions: SessionRegistry::new(),
    });

    (create_router(state.clone()), state, backend)
}

/// All Set-Cookie header values on a response.
#[allow(dead_code)]
pub fn set_cookie_headers(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

#[allow(dead_code)]
pub fn find_cookie(headers: &[String], name: &str) -> String {
    headers
        .iter()
        .find(|value| value.starts_with(&format!("{name}=")))
        .cloned()
        .unwrap_or_else(|| panic!("missing Set-Cookie header for {name}: {headers:?}"))
}

/// Decode a JSON response body.
#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Sign up a user through the API and return the `name=value` pair of the
/// session cookie, ready for a Cookie request header.
#[allow(dead_code)]
pub async fn signup_user(app: &axum::Router, email: &str, name: &str) -> String {
    let payload = json!({
        "name": name,
        "email": email,
        "password": "hunter22",
        "confirmPassword": "hunter22",
    });

    let response = app
        .clone()
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

    assert_eq!(response.status(), StatusCode::OK, "signup should succeed");

    let set_cookies = set_cookie_headers(&response);
    let cookie = find_cookie(&set_cookies, "racetrack_token");
    cookie.split(';').next().unwrap().to_string()
}

/// Create a race through the API and return its id.
#[allow(dead_code)]
pub async fn create_race(
    app: &axum::Router,
    cookie: &str,
    body: serde_json::Value,
) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/races")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::COOKIE, cookie)
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.status(),
        StatusCode::CREATED,
        "race creation should succeed"
    );
    body_json(response).await
}
