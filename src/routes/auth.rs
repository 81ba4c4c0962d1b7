// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Password authentication routes.
//!
//! Login and signup open a hosted session, park its container pair in the
//! session registry, and hand the browser an HttpOnly cookie holding this
//! service's own session JWT. The hosted tokens themselves never leave
//! the server.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::Result;
use crate::middleware::auth::{cookie_session_user, create_jwt, AuthUser, SESSION_COOKIE};
use crate::models::User;
use crate::stores::{AuthStore, UserSession};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/session", get(session_probe))
        .route("/api/auth/forgot-password", post(forgot_password))
}

/// Routes guarded by the auth middleware (applied in routes/mod.rs).
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/reset-password", post(reset_password))
}

// ─── Payloads ────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    #[validate(email(message = "Enter a valid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct SignupPayload {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Enter a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub confirm_password: String,
}

impl SignupPayload {
    /// Derive rules plus the confirmation match.
    pub fn check(&self) -> std::result::Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(e) => e,
        };

        if self.password != self.confirm_password {
            let mut err = ValidationError::new("password_mismatch");
            err.message = Some("Passwords do not match".into());
            errors.add("confirm_password".into(), err);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordPayload {
    #[validate(email(message = "Enter a valid email"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordPayload {
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub confirm_password: String,
}

impl ResetPasswordPayload {
    pub fn check(&self) -> std::result::Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(e) => e,
        };

        if self.password != self.confirm_password {
            let mut err = ValidationError::new("password_mismatch");
            err.message = Some("Passwords do not match".into());
            errors.add("confirm_password".into(), err);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

// ─── Responses ───────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: User,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub message: String,
}

// ─── Handlers ────────────────────────────────────────────────

/// Log in with email + password and mint the session cookie.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(payload): Json<LoginPayload>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    payload.validate()?;

    let session = Arc::new(UserSession::new(state.backend.clone()));
    let user = session.auth.login(&payload.email, &payload.password).await?;

    state.sessions.insert(user.id, session);
    let jwt = create_jwt(user.id, &state.config.session_signing_key)?;

    tracing::info!(user_id = %user.id, "User logged in");

    let jar = jar.add(session_cookie(jwt, &state.config.frontend_url));
    Ok((jar, Json(AuthResponse { user })))
}

/// Create an account, open its first session, and mint the cookie.
async fn signup(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(payload): Json<SignupPayload>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    payload.check()?;

    let session = Arc::new(UserSession::new(state.backend.clone()));
    let user = session
        .auth
        .signup(&payload.email, &payload.password, &payload.name)
        .await?;

    state.sessions.insert(user.id, session);
    let jwt = create_jwt(user.id, &state.config.session_signing_key)?;

    tracing::info!(user_id = %user.id, "User signed up");

    let jar = jar.add(session_cookie(jwt, &state.config.frontend_url));
    Ok((jar, Json(AuthResponse { user })))
}

/// Report whether the caller has a live session.
///
/// Always answers 200; failures on the hosted side just mean "not
/// logged in" here.
async fn session_probe(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Json<SessionResponse> {
    let Some(user_id) = cookie_session_user(&state, &jar) else {
        return Json(SessionResponse {
            authenticated: false,
            user: None,
        });
    };

    let Some(session) = state.sessions.get(user_id) else {
        return Json(SessionResponse {
            authenticated: false,
            user: None,
        });
    };

    match session.auth.check_session().await {
        Some(user) => Json(SessionResponse {
            authenticated: true,
            user: Some(user),
        }),
        None => {
            // The hosted session is gone; forget ours too
            state.sessions.remove(user_id);
            Json(SessionResponse {
                authenticated: false,
                user: None,
            })
        }
    }
}

/// Send a password-reset email.
async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ForgotPasswordPayload>,
) -> Result<Json<MessageResponse>> {
    payload.validate()?;

    let redirect_to = format!("{}/reset-password", state.config.frontend_url);
    let store = AuthStore::new(state.backend.clone());
    store.forgot_password(&payload.email, &redirect_to).await?;

    Ok(Json(MessageResponse {
        message: "Check your email for a reset link.".to_string(),
    }))
}

/// Revoke the hosted session, drop ours, and clear the cookie.
async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    jar: CookieJar,
) -> Result<(StatusCode, CookieJar)> {
    if let Some(session) = state.sessions.get(user.user_id) {
        session.auth.logout().await?;
    }
    state.sessions.remove(user.user_id);

    tracing::info!(user_id = %user.user_id, "User logged out");

    let jar = jar.add(removal_cookie(&state.config.frontend_url));
    Ok((StatusCode::NO_CONTENT, jar))
}

/// Set a new password for the logged-in user.
async fn reset_password(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ResetPasswordPayload>,
) -> Result<Json<MessageResponse>> {
    payload.check()?;

    let session = state.session(user.user_id)?;
    session.auth.reset_password(&payload.password).await?;

    Ok(Json(MessageResponse {
        message: "Password updated.".to_string(),
    }))
}

// ─── Cookies ─────────────────────────────────────────────────

// Secure only when the frontend is served over https, so local
// development over plain http keeps working
fn session_cookie(token: String, frontend_url: &str) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(time::Duration::days(30));
    cookie.set_secure(frontend_url.starts_with("https://"));
    cookie
}

fn removal_cookie(frontend_url: &str) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(time::Duration::ZERO);
    cookie.set_secure(frontend_url.starts_with("https://"));
    cookie
}
