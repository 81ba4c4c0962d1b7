// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Race list container.
//!
//! The list is a cache of the user's rows, replaced wholesale on load and
//! patched with the server's echo on add/update/delete. Mutations never
//! apply optimistically; the merge uses only what the backend returned.

use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::backend::RaceBackend;
use crate::error::{AppError, Result};
use crate::models::race::NewRace;
use crate::models::Race;
use crate::stores::AuthStore;

/// Observable race-list state.
#[derive(Debug, Clone, Default)]
pub struct RaceSnapshot {
    pub races: Vec<Race>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Per-session race container.
pub struct RaceStore {
    backend: Arc<dyn RaceBackend>,
    auth: Arc<AuthStore>,
    state: RwLock<RaceSnapshot>,
}

impl RaceStore {
    pub fn new(backend: Arc<dyn RaceBackend>, auth: Arc<AuthStore>) -> Self {
        Self {
            backend,
            auth,
            state: RwLock::new(RaceSnapshot::default()),
        }
    }

    // ─── Snapshot Reads ──────────────────────────────────────

    pub async fn snapshot(&self) -> RaceSnapshot {
        self.state.read().await.clone()
    }

    pub async fn races(&self) -> Vec<Race> {
        self.state.read().await.races.clone()
    }

    pub async fn find(&self, id: Uuid) -> Option<Race> {
        self.state
            .read()
            .await
            .races
            .iter()
            .find(|race| race.id == id)
            .cloned()
    }

    // ─── Operations ──────────────────────────────────────────

    /// Replace the list with the backend's rows (date descending).
    pub async fn load_races(&self) -> Result<Vec<Race>> {
        self.begin().await;

        let (token, user_id) = match self.credentials().await {
            Ok(credentials) => credentials,
            Err(e) => {
                self.fail(&e).await;
                return Err(e);
            }
        };

        match self.backend.query_records(&token, user_id).await {
            Ok(races) => {
                let mut state = self.state.write().await;
                state.races = races.clone();
                state.is_loading = false;
                Ok(races)
            }
            Err(e) => {
                self.fail(&e).await;
                Err(e)
            }
        }
    }

    /// Insert a race and append the stored row to the list.
    pub async fn add_race(&self, draft: &NewRace) -> Result<Race> {
        self.begin().await;

        let (token, user_id) = match self.credentials().await {
            Ok(credentials) => credentials,
            Err(e) => {
                self.fail(&e).await;
                return Err(e);
            }
        };

        match self.backend.insert_record(&token, user_id, draft).await {
            Ok(race) => {
                let mut state = self.state.write().await;
                state.races.push(race.clone());
                state.is_loading = false;
                Ok(race)
            }
            Err(e) => {
                self.fail(&e).await;
                Err(e)
            }
        }
    }

    /// Update a race and replace the matching list element with the echo.
    pub async fn update_race(&self, id: Uuid, draft: &NewRace) -> Result<Race> {
        self.begin().await;

        let token = match self.auth.access_token().await {
            Ok(token) => token,
            Err(e) => {
                self.fail(&e).await;
                return Err(e);
            }
        };

        match self.backend.update_record(&token, id, draft).await {
            Ok(race) => {
                let mut state = self.state.write().await;
                if let Some(slot) = state.races.iter_mut().find(|r| r.id == id) {
                    *slot = race.clone();
                }
                state.is_loading = false;
                Ok(race)
            }
            Err(e) => {
                self.fail(&e).await;
                Err(e)
            }
        }
    }

    /// Delete a race and drop it from the list.
    ///
    /// An id that matches nothing is a successful no-op at every layer.
    pub async fn delete_race(&self, id: Uuid) -> Result<()> {
        self.begin().await;

        let token = match self.auth.access_token().await {
            Ok(token) => token,
            Err(e) => {
                self.fail(&e).await;
                return Err(e);
            }
        };

        match self.backend.delete_record(&token, id).await {
            Ok(()) => {
                let mut state = self.state.write().await;
                state.races.retain(|race| race.id != id);
                state.is_loading = false;
                Ok(())
            }
            Err(e) => {
                self.fail(&e).await;
                Err(e)
            }
        }
    }

    // ─── Lifecycle Phases ────────────────────────────────────

    async fn credentials(&self) -> Result<(String, Uuid)> {
        let token = self.auth.access_token().await?;
        let user_id = self.auth.user_id().await?;
        Ok((token, user_id))
    }

    async fn begin(&self) {
        let mut state = self.state.write().await;
        state.is_loading = true;
        state.error = None;
    }

    async fn fail(&self, error: &AppError) {
        let mut state = self.state.write().await;
        state.is_loading = false;
        state.error = Some(error.to_string());
    }
}
