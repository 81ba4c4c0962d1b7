// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth container: session state plus hosted-token lifecycle.
//!
//! Handles:
//! - Login, signup, logout against the hosted identity service
//! - Session probing (errors degrade to unauthenticated, never surface)
//! - Password reset request and update
//! - Proactive access-token refresh with a 5-minute expiry margin

use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::{Mutex, RwLock};

use crate::backend::{RaceBackend, SessionTokens};
use crate::error::{AppError, Result};
use crate::models::User;
use uuid::Uuid;

/// Margin before token expiration when we proactively refresh (5 minutes).
const TOKEN_REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// Observable auth state.
#[derive(Debug, Clone, Default)]
pub struct AuthSnapshot {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Per-session auth container.
pub struct AuthStore {
    backend: Arc<dyn RaceBackend>,
    state: RwLock<AuthSnapshot>,
    /// Hosted-session tokens. Held apart from the snapshot so token
    /// maintenance never shows up as container state churn.
    tokens: RwLock<Option<SessionTokens>>,
    /// Serializes token refreshes for this session.
    refresh_lock: Mutex<()>,
}

impl AuthStore {
    pub fn new(backend: Arc<dyn RaceBackend>) -> Self {
        Self {
            backend,
            state: RwLock::new(AuthSnapshot::default()),
            tokens: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    // ─── Snapshot Reads ──────────────────────────────────────

    pub async fn snapshot(&self) -> AuthSnapshot {
        self.state.read().await.clone()
    }

    pub async fn user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    pub async fn user_id(&self) -> Result<Uuid> {
        self.state
            .read()
            .await
            .user
            .as_ref()
            .map(|user| user.id)
            .ok_or(AppError::Unauthorized)
    }

    // ─── Operations ──────────────────────────────────────────

    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        self.begin().await;

        match self.backend.authenticate(email, password).await {
            Ok(session) => Ok(self.adopt(session.user, session.tokens).await),
            Err(e) => {
                self.fail(&e).await;
                Err(e)
            }
        }
    }

    pub async fn signup(&self, email: &str, password: &str, name: &str) -> Result<User> {
        self.begin().await;

        match self.backend.create_session(email, password, name).await {
            Ok(session) => Ok(self.adopt(session.user, session.tokens).await),
            Err(e) => {
                self.fail(&e).await;
                Err(e)
            }
        }
    }

    /// Revoke the hosted session and drop local auth state.
    pub async fn logout(&self) -> Result<()> {
        self.begin().await;

        let token = self
            .tokens
            .read()
            .await
            .as_ref()
            .map(|t| t.access_token.clone());

        let result = match token {
            Some(token) => self.backend.end_session(&token).await,
            // No hosted session to revoke
            None => Ok(()),
        };

        match result {
            Ok(()) => {
                *self.tokens.write().await = None;
                let mut state = self.state.write().await;
                *state = AuthSnapshot::default();
                Ok(())
            }
            Err(e) => {
                self.fail(&e).await;
                Err(e)
            }
        }
    }

    /// Probe whether the hosted session is still alive.
    ///
    /// Any failure here means "not logged in", not an error the caller
    /// sees; the snapshot ends unauthenticated with no error message.
    pub async fn check_session(&self) -> Option<User> {
        self.begin().await;

        let probe = match self.access_token().await {
            Ok(token) => self.backend.current_user(&token).await,
            Err(e) => Err(e),
        };

        match probe {
            Ok(user) => {
                let mut state = self.state.write().await;
                state.user = Some(user.clone());
                state.is_authenticated = true;
                state.is_loading = false;
                Some(user)
            }
            Err(e) => {
                tracing::debug!(error = %e, "Session probe failed, treating as unauthenticated");
                let mut state = self.state.write().await;
                *state = AuthSnapshot::default();
                None
            }
        }
    }

    pub async fn forgot_password(&self, email: &str, redirect_to: &str) -> Result<()> {
        self.begin().await;

        match self
            .backend
            .request_password_reset(email, redirect_to)
            .await
        {
            Ok(()) => {
                self.settle().await;
                Ok(())
            }
            Err(e) => {
                self.fail(&e).await;
                Err(e)
            }
        }
    }

    pub async fn reset_password(&self, new_password: &str) -> Result<()> {
        self.begin().await;

        let token = match self.access_token().await {
            Ok(token) => token,
            Err(e) => {
                self.fail(&e).await;
                return Err(e);
            }
        };

        match self.backend.update_password(&token, new_password).await {
            Ok(()) => {
                self.settle().await;
                Ok(())
            }
            Err(e) => {
                self.fail(&e).await;
                Err(e)
            }
        }
    }

    // ─── Token Maintenance ───────────────────────────────────

    /// Get a valid (non-expired) hosted access token.
    ///
    /// Fast path returns the held token while it is comfortably inside its
    /// lifetime. Near expiry, the per-session lock serializes the refresh
    /// and waiters re-check afterwards, so concurrent operations trigger
    /// at most one refresh exchange.
    pub async fn access_token(&self) -> Result<String> {
        let now = Utc::now();
        let margin = Duration::seconds(TOKEN_REFRESH_MARGIN_SECS);

        match self.tokens.read().await.as_ref() {
            Some(tokens) if now + margin < tokens.expires_at => {
                return Ok(tokens.access_token.clone());
            }
            Some(_) => {}
            None => return Err(AppError::Unauthorized),
        }

        let _guard = self.refresh_lock.lock().await;

        // Another task may have refreshed while we waited on the lock
        let refresh_token = {
            let tokens = self.tokens.read().await;
            match tokens.as_ref() {
                Some(tokens) if now + margin < tokens.expires_at => {
                    return Ok(tokens.access_token.clone());
                }
                Some(tokens) => tokens.refresh_token.clone(),
                None => return Err(AppError::Unauthorized),
            }
        };

        tracing::info!("Hosted access token expiring, refreshing");
        let session = self.backend.refresh_session(&refresh_token).await?;

        let access_token = session.tokens.access_token.clone();
        *self.tokens.write().await = Some(session.tokens);
        {
            let mut state = self.state.write().await;
            state.user = Some(session.user);
            state.is_authenticated = true;
        }

        Ok(access_token)
    }

    // ─── Lifecycle Phases ────────────────────────────────────

    async fn begin(&self) {
        let mut state = self.state.write().await;
        state.is_loading = true;
        state.error = None;
    }

    async fn settle(&self) {
        let mut state = self.state.write().await;
        state.is_loading = false;
    }

    async fn fail(&self, error: &AppError) {
        let mut state = self.state.write().await;
        state.is_loading = false;
        state.error = Some(error.to_string());
    }

    async fn adopt(&self, user: User, tokens: SessionTokens) -> User {
        *self.tokens.write().await = Some(tokens);
        let mut state = self.state.write().await;
        state.user = Some(user.clone());
        state.is_authenticated = true;
        state.is_loading = false;
        user
    }
}
