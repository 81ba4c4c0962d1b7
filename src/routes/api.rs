// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Race record API routes.
//!
//! Every handler runs behind the auth middleware and goes through the
//! caller's session containers, so the response always reflects the same
//! state a subsequent page render would see.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::race::RaceDraft;
use crate::models::{Race, User};
use crate::stores::UserSession;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/races", get(list_races).post(create_race))
        .route("/api/races/names", get(race_name_suggestions))
        .route("/api/races/history", get(race_history))
        .route("/api/races/{id}", put(update_race).delete(delete_race))
}

// ─── Responses ───────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct RacesResponse {
    pub races: Vec<Race>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct NameSuggestionsResponse {
    pub names: Vec<String>,
}

// ─── Queries ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NameQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub name: String,
}

// ─── Handlers ────────────────────────────────────────────────

/// The logged-in user's profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<User>> {
    let session = state.session(user.user_id)?;
    let user = session.auth.user().await.ok_or(AppError::Unauthorized)?;
    Ok(Json(user))
}

/// All of the user's races, newest race day first.
async fn list_races(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<RacesResponse>> {
    let session = state.session(user.user_id)?;
    let races = session.races.load_races().await?;

    tracing::debug!(user_id = %user.user_id, count = races.len(), "Listed races");

    Ok(Json(RacesResponse { races }))
}

/// Record a new race.
async fn create_race(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(draft): Json<RaceDraft>,
) -> Result<(StatusCode, Json<Race>)> {
    draft.check()?;

    let session = state.session(user.user_id)?;
    let new_race = draft.into_new_race();
    let race = session.races.add_race(&new_race).await?;

    record_name_use(&state, &session, &race.name).await;

    tracing::debug!(user_id = %user.user_id, race_id = %race.id, "Created race");

    Ok((StatusCode::CREATED, Json(race)))
}

/// Rewrite an existing race.
async fn update_race(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(draft): Json<RaceDraft>,
) -> Result<Json<Race>> {
    draft.check()?;

    let session = state.session(user.user_id)?;
    let new_race = draft.into_new_race();
    let race = session.races.update_race(id, &new_race).await?;

    record_name_use(&state, &session, &race.name).await;

    tracing::debug!(user_id = %user.user_id, race_id = %race.id, "Updated race");

    Ok(Json(race))
}

/// Delete a race. Deleting an id that no longer exists still succeeds.
async fn delete_race(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let session = state.session(user.user_id)?;
    session.races.delete_race(id).await?;

    tracing::debug!(user_id = %user.user_id, race_id = %id, "Deleted race");

    Ok(StatusCode::NO_CONTENT)
}

/// Autocomplete suggestions for the race-name field.
///
/// Suggestions are decoration on a form; a failed lookup answers an empty
/// list rather than an error.
async fn race_name_suggestions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<NameQuery>,
) -> Result<Json<NameSuggestionsResponse>> {
    let q = query.q.trim();
    if q.len() < 2 {
        return Ok(Json(NameSuggestionsResponse { names: Vec::new() }));
    }

    let session = state.session(user.user_id)?;
    let token = session.auth.access_token().await?;

    let names = match state.backend.search_race_names(&token, q).await {
        Ok(names) => names,
        Err(e) => {
            tracing::warn!(error = %e, "Race-name search failed");
            Vec::new()
        }
    };

    Ok(Json(NameSuggestionsResponse { names }))
}

/// The user's past results for one race, newest first.
async fn race_history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<RacesResponse>> {
    let name = query.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Race name is required".to_string()));
    }

    let session = state.session(user.user_id)?;
    let token = session.auth.access_token().await?;
    let races = state.backend.race_history(&token, name).await?;

    Ok(Json(RacesResponse { races }))
}

/// Count a name use for autocomplete ranking.
///
/// The race itself is already saved when this runs; failures only log.
async fn record_name_use(state: &AppState, session: &UserSession, name: &str) {
    let token = match session.auth.access_token().await {
        Ok(token) => token,
        Err(e) => {
            tracing::warn!(error = %e, "Skipping race-name tally");
            return;
        }
    };

    if let Err(e) = state.backend.upsert_race_name(&token, name).await {
        tracing::warn!(error = %e, "Race-name tally failed");
    }
}
