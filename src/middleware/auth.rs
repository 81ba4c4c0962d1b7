// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session-cookie authentication middleware.
//!
//! The service mints its own HS256 JWT at login and hands it out as an
//! HttpOnly cookie; API clients may instead send it as a bearer token.
//! Guards come in two flavors matching the route policy: API routes
//! answer 401, page-view routes redirect to the login page.

use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "racetrack_token";

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated user extracted from the session JWT.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

/// Middleware that requires a valid session on API routes.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_user =
        authenticated_user(&state, &jar, &request).ok_or(StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(auth_user);
    Ok(next.run(request).await)
}

/// Middleware that requires a valid session on page-view routes.
///
/// Unauthenticated requests are sent to the login page instead of
/// receiving an API error.
pub async fn require_page_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticated_user(&state, &jar, &request) {
        Some(auth_user) => {
            request.extensions_mut().insert(auth_user);
            next.run(request).await
        }
        None => Redirect::to("/login").into_response(),
    }
}

/// Resolve the session JWT (cookie first, then bearer header) to a live
/// session's user.
fn authenticated_user(state: &AppState, jar: &CookieJar, request: &Request) -> Option<AuthUser> {
    let token = if let Some(cookie) = jar.get(SESSION_COOKIE) {
        cookie.value().to_string()
    } else {
        let auth_header = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        match auth_header {
            Some(h) if h.starts_with("Bearer ") => h[7..].to_string(),
            _ => return None,
        }
    };

    verify_token(state, &token).map(|user_id| AuthUser { user_id })
}

/// Resolve just the session cookie to a live session's user id.
///
/// For public routes (session probe, page bootstraps) that report auth
/// state without guarding anything.
pub fn cookie_session_user(state: &AppState, jar: &CookieJar) -> Option<Uuid> {
    verify_token(state, jar.get(SESSION_COOKIE)?.value())
}

fn verify_token(state: &AppState, token: &str) -> Option<Uuid> {
    let key = DecodingKey::from_secret(&state.config.session_signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(token, &key, &validation).ok()?;
    let user_id: Uuid = token_data.claims.sub.parse().ok()?;

    // The cookie can outlive the registry (process restart); only a live
    // session counts as authenticated
    state.sessions.get(user_id)?;

    Some(user_id)
}

/// Create a session JWT for a user.
pub fn create_jwt(user_id: Uuid, signing_key: &[u8]) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        iat: now,
        exp: now + 30 * 24 * 60 * 60, // 30 days
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}
