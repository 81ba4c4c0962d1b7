// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Headless page views.
//!
//! Each route answers the JSON a page render needs: the assembled view
//! data for data-bearing pages, or a small page descriptor for pages that
//! are pure forms. Guarded pages sit behind the page middleware, which
//! redirects to /login instead of answering 401.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Extension, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;

use crate::countdown::{next_countdown, Countdown};
use crate::error::{AppError, Result};
use crate::middleware::auth::{cookie_session_user, AuthUser};
use crate::models::metrics::{calculate_metrics, fun_facts};
use crate::models::race::TerrainType;
use crate::models::{FunFacts, Metrics, Race, User};
use crate::time_utils::{calculate_pace, format_pace, format_time};
use crate::AppState;

pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(landing))
        .route("/login", get(login_page))
        .route("/signup", get(signup_page))
        .route("/reset-password", get(reset_password_page))
}

/// Routes guarded by the page middleware (applied in routes/mod.rs).
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/races", get(races_completed))
        .route("/races/upcoming", get(races_upcoming))
        .route("/races/new", get(new_race_page))
        .route("/races/edit/{id}", get(edit_race_page))
}

// ─── Views ───────────────────────────────────────────────────

/// Descriptor for pages that carry no server data.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: &'static str,
    pub authenticated: bool,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub user: User,
    pub metrics: Metrics,
    pub fun_facts: FunFacts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countdown: Option<Countdown>,
}

/// A race plus its precomputed display strings.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct RaceListItem {
    pub race: Race,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_display: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pace_display: Option<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct RaceListView {
    pub races: Vec<RaceListItem>,
    /// Count before terrain/search filtering
    pub total: u32,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct EditRaceView {
    pub race: Race,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub terrain: Option<TerrainType>,
    #[serde(default)]
    pub search: Option<String>,
}

// ─── Public Pages ────────────────────────────────────────────

/// Landing page. Renders for everyone; the flag drives the header CTA.
async fn landing(State(state): State<Arc<AppState>>, jar: CookieJar) -> Json<PageInfo> {
    Json(PageInfo {
        page: "landing",
        authenticated: cookie_session_user(&state, &jar).is_some(),
    })
}

/// Login form. Already-authenticated visitors go straight to the dashboard.
async fn login_page(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    if cookie_session_user(&state, &jar).is_some() {
        return Redirect::to("/dashboard").into_response();
    }
    Json(PageInfo {
        page: "login",
        authenticated: false,
    })
    .into_response()
}

/// Signup form, same redirect rule as login.
async fn signup_page(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    if cookie_session_user(&state, &jar).is_some() {
        return Redirect::to("/dashboard").into_response();
    }
    Json(PageInfo {
        page: "signup",
        authenticated: false,
    })
    .into_response()
}

/// Password-reset form, reached from the email link.
async fn reset_password_page(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Json<PageInfo> {
    Json(PageInfo {
        page: "reset-password",
        authenticated: cookie_session_user(&state, &jar).is_some(),
    })
}

// ─── Protected Pages ─────────────────────────────────────────

/// Dashboard: aggregate metrics, fun facts, and the next-race countdown.
async fn dashboard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DashboardView>> {
    let session = state.session(user.user_id)?;
    let profile = session.auth.user().await.ok_or(AppError::Unauthorized)?;
    let races = session.races.load_races().await?;

    let metrics = calculate_metrics(&races);
    let facts = fun_facts(&metrics);
    let countdown = next_countdown(&races, Utc::now());

    Ok(Json(DashboardView {
        user: profile,
        metrics,
        fun_facts: facts,
        countdown,
    }))
}

/// Completed races, filterable by terrain and free-text search.
async fn races_completed(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<RaceListView>> {
    race_list(&state, user, &query, true).await
}

/// Planned races, same filters as the completed list.
async fn races_upcoming(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<RaceListView>> {
    race_list(&state, user, &query, false).await
}

async fn race_list(
    state: &AppState,
    user: AuthUser,
    query: &ListQuery,
    completed: bool,
) -> Result<Json<RaceListView>> {
    let session = state.session(user.user_id)?;
    let races = session.races.load_races().await?;

    let mut matching: Vec<&Race> = races
        .iter()
        .filter(|race| race.is_completed == completed)
        .collect();
    // `total` counts the whole tab, not the filtered subset
    let total = matching.len() as u32;

    if let Some(terrain) = query.terrain {
        matching.retain(|race| race.terrain_type == terrain);
    }

    if let Some(needle) = query.search.as_deref() {
        let needle = needle.trim().to_lowercase();
        if !needle.is_empty() {
            matching.retain(|race| {
                race.name.to_lowercase().contains(&needle)
                    || race
                        .location
                        .as_deref()
                        .is_some_and(|location| location.to_lowercase().contains(&needle))
            });
        }
    }

    let races = matching.into_iter().map(list_item).collect();
    Ok(Json(RaceListView { races, total }))
}

/// New-race form.
async fn new_race_page() -> Json<PageInfo> {
    Json(PageInfo {
        page: "new-race",
        authenticated: true,
    })
}

/// Edit form for one race. An unknown id sends the visitor back to the
/// race list without an error page.
async fn edit_race_page(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    let session = state.session(user.user_id)?;
    let races = session.races.load_races().await?;

    match races.into_iter().find(|race| race.id == id) {
        Some(race) => Ok(Json(EditRaceView { race }).into_response()),
        None => Ok(Redirect::to("/races").into_response()),
    }
}

fn list_item(race: &Race) -> RaceListItem {
    // Zero time means the result was never filled in
    let time = race.time.filter(|t| *t > 0);
    let time_display = time.map(format_time);
    let pace_display = time
        .filter(|_| race.distance > 0.0)
        .map(|t| format_pace(calculate_pace(t, race.distance)));

    RaceListItem {
        race: race.clone(),
        time_display,
        pace_display,
    }
}
