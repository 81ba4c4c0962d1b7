// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Hosted-backend client speaking the GoTrue + PostgREST wire protocol.
//!
//! Handles:
//! - Password auth (login, signup, refresh, logout, recover, update)
//! - Race row CRUD with row translation to the API shape
//! - Race-name suggestion lookups and usage upserts
//! - Error-body message extraction across both subsystems

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::backend::{AuthSession, RaceBackend, SessionTokens};
use crate::error::AppError;
use crate::models::race::{NewRace, RaceRow, RaceWriteRow};
use crate::models::{Race, User};

/// Hosted platform client.
///
/// Every request carries the project's `apikey` header; requests on behalf
/// of a session add the session's bearer token, and row-level security on
/// the hosted side scopes rows to that token's user.
#[derive(Clone)]
pub struct SupabaseBackend {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseBackend {
    /// Create a new client for a hosted project.
    pub fn new(base_url: String, anon_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            anon_key,
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.base_url, path)
    }

    fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1{}", self.base_url, path)
    }

    /// Check response status and return error if not successful.
    async fn check_response(&self, response: reqwest::Response) -> Result<(), AppError> {
        if response.status().is_success() {
            return Ok(());
        }
        Err(response_error(response).await)
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            return Err(response_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Backend(format!("JSON parse error: {}", e)))
    }
}

#[async_trait]
impl RaceBackend for SupabaseBackend {
    async fn authenticate(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        let response = self
            .http
            .post(self.auth_url("/token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        let tokens: TokenResponse = self.check_response_json(response).await?;
        Ok(tokens.into_session())
    }

    async fn create_session(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<AuthSession, AppError> {
        let response = self
            .http
            .post(self.auth_url("/signup"))
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "data": { "name": name },
            }))
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        // Without email auto-confirm the identity service answers with the
        // bare user and no tokens; there is no session to open yet.
        match self.check_response_json(response).await? {
            SignupResponse::Session(tokens) => Ok(tokens.into_session()),
            SignupResponse::Confirmation(_) => Err(AppError::Backend(
                "Account created. Check your email to confirm it, then log in.".to_string(),
            )),
        }
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AppError> {
        let response = self
            .http
            .post(self.auth_url("/token"))
            .query(&[("grant_type", "refresh_token")])
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Session refresh request failed: {}", e)))?;

        let tokens: TokenResponse = self.check_response_json(response).await?;
        Ok(tokens.into_session())
    }

    async fn end_session(&self, access_token: &str) -> Result<(), AppError> {
        let response = self
            .http
            .post(self.auth_url("/logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        self.check_response(response).await
    }

    async fn current_user(&self, access_token: &str) -> Result<User, AppError> {
        let response = self
            .http
            .get(self.auth_url("/user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        let user: GoTrueUser = self.check_response_json(response).await?;
        Ok(user.into_user())
    }

    /// POST {url}/auth/v1/recover?redirect_to={frontend}/reset-password
    async fn request_password_reset(&self, email: &str, redirect_to: &str) -> Result<(), AppError> {
        let response = self
            .http
            .post(self.auth_url("/recover"))
            .query(&[("redirect_to", redirect_to)])
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Password reset request failed: {}", e)))?;

        self.check_response(response).await
    }

    async fn update_password(&self, access_token: &str, new_password: &str) -> Result<(), AppError> {
        let response = self
            .http
            .put(self.auth_url("/user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "password": new_password }))
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        self.check_response(response).await
    }

    async fn query_records(&self, access_token: &str, user_id: Uuid) -> Result<Vec<Race>, AppError> {
        let response = self
            .http
            .get(self.rest_url("/races"))
            .query(&[
                ("select", "*".to_string()),
                ("user_id", format!("eq.{}", user_id)),
                ("order", "date.desc".to_string()),
            ])
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        let rows: Vec<RaceRow> = self.check_response_json(response).await?;
        Ok(rows.into_iter().map(Race::from).collect())
    }

    async fn insert_record(
        &self,
        access_token: &str,
        user_id: Uuid,
        race: &NewRace,
    ) -> Result<Race, AppError> {
        let response = self
            .http
            .post(self.rest_url("/races"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .header("Prefer", "return=representation")
            .header("Accept", "application/vnd.pgrst.object+json")
            .json(&RaceWriteRow::insert(user_id, race))
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        let row: RaceRow = self.check_response_json(response).await?;
        Ok(Race::from(row))
    }

    async fn update_record(
        &self,
        access_token: &str,
        id: Uuid,
        race: &NewRace,
    ) -> Result<Race, AppError> {
        let response = self
            .http
            .patch(self.rest_url("/races"))
            .query(&[("id", format!("eq.{}", id))])
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .header("Prefer", "return=representation")
            .header("Accept", "application/vnd.pgrst.object+json")
            .json(&RaceWriteRow::update(race))
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        let row: RaceRow = self.check_response_json(response).await?;
        Ok(Race::from(row))
    }

    async fn delete_record(&self, access_token: &str, id: Uuid) -> Result<(), AppError> {
        let response = self
            .http
            .delete(self.rest_url("/races"))
            .query(&[("id", format!("eq.{}", id))])
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        // Deleting zero rows is a success on the hosted side too
        self.check_response(response).await
    }

    async fn search_race_names(
        &self,
        access_token: &str,
        query: &str,
    ) -> Result<Vec<String>, AppError> {
        let response = self
            .http
            .get(self.rest_url("/race_names"))
            .query(&[
                ("select", "name".to_string()),
                ("name", format!("ilike.*{}*", query)),
                ("order", "count.desc".to_string()),
                ("limit", "5".to_string()),
            ])
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        let rows: Vec<NameRow> = self.check_response_json(response).await?;
        Ok(rows.into_iter().map(|row| row.name).collect())
    }

    /// POST {url}/rest/v1/rpc/upsert_race_name
    ///
    /// Inserts the name or increments its usage counter.
    async fn upsert_race_name(&self, access_token: &str, name: &str) -> Result<(), AppError> {
        let response = self
            .http
            .post(self.rest_url("/rpc/upsert_race_name"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "race_name": name }))
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        self.check_response(response).await
    }

    async fn race_history(&self, access_token: &str, name: &str) -> Result<Vec<Race>, AppError> {
        let response = self
            .http
            .get(self.rest_url("/races"))
            .query(&[
                ("select", "*".to_string()),
                ("name", format!("eq.{}", name)),
                ("order", "date.desc".to_string()),
            ])
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        let rows: Vec<RaceRow> = self.check_response_json(response).await?;
        Ok(rows.into_iter().map(Race::from).collect())
    }
}

/// Turn a failed response into a backend error with the best message.
async fn response_error(response: reqwest::Response) -> AppError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    AppError::Backend(extract_message(status, &body))
}

/// Pull the human-readable message out of an error body.
///
/// The auth and row subsystems disagree on the field name (`msg`,
/// `message`, `error_description`, bare `error`), so try each in turn and
/// fall back to the raw body.
fn extract_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(ApiErrorBody::into_message)
        .unwrap_or_else(|| format!("HTTP {}: {}", status, body))
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ApiErrorBody {
    fn into_message(self) -> Option<String> {
        self.message
            .or(self.msg)
            .or(self.error_description)
            .or(self.error)
    }
}

/// Token grant response from the identity service.
#[derive(Debug, Clone, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    /// Access-token lifetime in seconds
    expires_in: i64,
    user: GoTrueUser,
}

impl TokenResponse {
    fn into_session(self) -> AuthSession {
        AuthSession {
            user: self.user.into_user(),
            tokens: SessionTokens {
                access_token: self.access_token,
                refresh_token: self.refresh_token,
                expires_at: Utc::now() + Duration::seconds(self.expires_in),
            },
        }
    }
}

/// Signup either opens a session or returns the unconfirmed user.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignupResponse {
    Session(TokenResponse),
    Confirmation(GoTrueUser),
}

/// User record as the identity service returns it.
#[derive(Debug, Clone, Deserialize)]
struct GoTrueUser {
    id: Uuid,
    email: Option<String>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    user_metadata: Option<UserMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct UserMetadata {
    name: Option<String>,
}

impl GoTrueUser {
    fn into_user(self) -> User {
        let name = self
            .user_metadata
            .and_then(|m| m.name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "User".to_string());

        User {
            id: self.id,
            email: self.email.unwrap_or_default(),
            name,
            created_at: self.created_at,
        }
    }
}

/// Single-column row from the name suggestion query.
#[derive(Debug, Deserialize)]
struct NameRow {
    name: String,
}
