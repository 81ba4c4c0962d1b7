// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Hosted-backend client seam.
//!
//! Everything the service needs from the hosted platform (identity and
//! durable race storage) goes through the [`RaceBackend`] trait, so the
//! stores and routes never know whether they are talking to the real
//! hosted service or the in-memory fake used in tests.

pub mod memory;
pub mod supabase;

pub use memory::InMemoryBackend;
pub use supabase::SupabaseBackend;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::race::NewRace;
use crate::models::{Race, User};

/// Hosted-session tokens returned by the identity service.
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

/// An authenticated hosted session: the user plus their tokens.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub tokens: SessionTokens,
}

/// Client interface to the hosted identity + row storage platform.
///
/// `access_token` arguments are the hosted backend's bearer token for the
/// session, not this service's own cookie JWT. Row-level security on the
/// hosted side scopes every record operation to the token's user.
#[async_trait]
pub trait RaceBackend: Send + Sync {
    // ─── Identity ────────────────────────────────────────────

    /// Exchange email + password for a session.
    async fn authenticate(&self, email: &str, password: &str) -> Result<AuthSession>;

    /// Register a new account and open its first session.
    async fn create_session(&self, email: &str, password: &str, name: &str)
        -> Result<AuthSession>;

    /// Exchange a refresh token for a fresh token pair.
    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession>;

    /// Revoke the session on the hosted side.
    async fn end_session(&self, access_token: &str) -> Result<()>;

    /// The user a hosted access token belongs to.
    async fn current_user(&self, access_token: &str) -> Result<User>;

    /// Send a password-reset email pointing back at `redirect_to`.
    async fn request_password_reset(&self, email: &str, redirect_to: &str) -> Result<()>;

    /// Set a new password for the session's user.
    async fn update_password(&self, access_token: &str, new_password: &str) -> Result<()>;

    // ─── Race records ────────────────────────────────────────

    /// All of the user's races, date descending.
    async fn query_records(&self, access_token: &str, user_id: Uuid) -> Result<Vec<Race>>;

    /// Insert a race and return the stored row.
    async fn insert_record(
        &self,
        access_token: &str,
        user_id: Uuid,
        race: &NewRace,
    ) -> Result<Race>;

    /// Update a race by id and return the stored row.
    async fn update_record(&self, access_token: &str, id: Uuid, race: &NewRace) -> Result<Race>;

    /// Delete a race by id. Deleting an absent id succeeds with no effect.
    async fn delete_record(&self, access_token: &str, id: Uuid) -> Result<()>;

    // ─── Race names ──────────────────────────────────────────

    /// Up to five name suggestions matching `query`, most used first.
    async fn search_race_names(&self, access_token: &str, query: &str) -> Result<Vec<String>>;

    /// Record one more use of a race name.
    async fn upsert_race_name(&self, access_token: &str, name: &str) -> Result<()>;

    /// The caller's races sharing a name, date descending.
    async fn race_history(&self, access_token: &str, name: &str) -> Result<Vec<Race>>;
}
