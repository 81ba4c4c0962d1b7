// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory stand-in for the hosted backend (offline mode).
//!
//! Backs tests and local development without a network dependency. Rows
//! and sessions live in process memory; behavior mirrors the hosted
//! platform's observable semantics, including row-level scoping of record
//! operations to the session user and single-object representation errors
//! on updates that match no row.

use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use dashmap::DashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::backend::{AuthSession, RaceBackend, SessionTokens};
use crate::error::AppError;
use crate::models::race::NewRace;
use crate::models::{Race, User};

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password: String,
}

/// In-memory backend fake.
pub struct InMemoryBackend {
    users: DashMap<Uuid, StoredUser>,
    races: DashMap<Uuid, Race>,
    race_names: DashMap<String, u32>,
    access_tokens: DashMap<String, Uuid>,
    refresh_tokens: DashMap<String, Uuid>,
    /// When set, every operation fails with this message.
    failure: RwLock<Option<String>>,
    /// Issued token lifetime in seconds.
    token_ttl: AtomicI64,
    request_count: AtomicU32,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            races: DashMap::new(),
            race_names: DashMap::new(),
            access_tokens: DashMap::new(),
            refresh_tokens: DashMap::new(),
            failure: RwLock::new(None),
            token_ttl: AtomicI64::new(3600),
            request_count: AtomicU32::new(0),
        }
    }

    // ─── Test Controls ───────────────────────────────────────

    /// Make every subsequent operation fail with `message`.
    pub async fn set_failure(&self, message: &str) {
        *self.failure.write().await = Some(message.to_string());
    }

    /// Return to normal operation.
    pub async fn clear_failure(&self) {
        *self.failure.write().await = None;
    }

    /// Shorten (or lengthen) the lifetime of newly issued tokens.
    pub fn set_token_ttl(&self, secs: i64) {
        self.token_ttl.store(secs, Ordering::Relaxed);
    }

    /// Number of backend calls made so far, failed calls included.
    pub fn request_count(&self) -> u32 {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Recorded usage count for a race name.
    pub fn race_name_count(&self, name: &str) -> u32 {
        self.race_names.get(name).map(|c| *c).unwrap_or(0)
    }

    // ─── Internals ───────────────────────────────────────────

    /// Count the call and apply the failure switch.
    async fn begin(&self) -> Result<(), AppError> {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        match self.failure.read().await.as_ref() {
            Some(message) => Err(AppError::Backend(message.clone())),
            None => Ok(()),
        }
    }

    fn user_id_for(&self, access_token: &str) -> Result<Uuid, AppError> {
        self.access_tokens
            .get(access_token)
            .map(|entry| *entry)
            .ok_or_else(|| AppError::Backend("Invalid token".to_string()))
    }

    fn mint_session(&self, user: User) -> AuthSession {
        let access_token = format!("access-{}", Uuid::new_v4());
        let refresh_token = format!("refresh-{}", Uuid::new_v4());
        self.access_tokens.insert(access_token.clone(), user.id);
        self.refresh_tokens.insert(refresh_token.clone(), user.id);

        let ttl = self.token_ttl.load(Ordering::Relaxed);
        AuthSession {
            user,
            tokens: SessionTokens {
                access_token,
                refresh_token,
                expires_at: Utc::now() + Duration::seconds(ttl),
            },
        }
    }

    fn materialize(id: Uuid, user_id: Uuid, draft: &NewRace) -> Race {
        Race {
            id,
            user_id,
            name: draft.name.clone(),
            date: draft.date,
            distance: draft.distance,
            race_type: draft.race_type,
            terrain_type: draft.terrain_type,
            time: draft.time,
            elevation_gain: draft.elevation_gain,
            position: draft.position,
            is_completed: draft.is_completed,
            notes: draft.notes.clone(),
            location: draft.location.clone(),
        }
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RaceBackend for InMemoryBackend {
    async fn authenticate(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        self.begin().await?;

        let user = self
            .users
            .iter()
            .find(|entry| entry.user.email == email && entry.password == password)
            .map(|entry| entry.user.clone())
            .ok_or_else(|| AppError::Backend("Invalid login credentials".to_string()))?;

        Ok(self.mint_session(user))
    }

    async fn create_session(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<AuthSession, AppError> {
        self.begin().await?;

        if self.users.iter().any(|entry| entry.user.email == email) {
            return Err(AppError::Backend("User already registered".to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: if name.is_empty() {
                "User".to_string()
            } else {
                name.to_string()
            },
            created_at: Utc::now(),
        };
        self.users.insert(
            user.id,
            StoredUser {
                user: user.clone(),
                password: password.to_string(),
            },
        );

        Ok(self.mint_session(user))
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AppError> {
        self.begin().await?;

        // Refresh tokens rotate: each one is good for a single exchange
        let (_, user_id) = self
            .refresh_tokens
            .remove(refresh_token)
            .ok_or_else(|| AppError::Backend("Invalid refresh token".to_string()))?;

        let user = self
            .users
            .get(&user_id)
            .map(|entry| entry.user.clone())
            .ok_or_else(|| AppError::Backend("Invalid refresh token".to_string()))?;

        Ok(self.mint_session(user))
    }

    async fn end_session(&self, access_token: &str) -> Result<(), AppError> {
        self.begin().await?;
        self.access_tokens.remove(access_token);
        Ok(())
    }

    async fn current_user(&self, access_token: &str) -> Result<User, AppError> {
        self.begin().await?;

        let user_id = self.user_id_for(access_token)?;
        self.users
            .get(&user_id)
            .map(|entry| entry.user.clone())
            .ok_or_else(|| AppError::Backend("Invalid token".to_string()))
    }

    async fn request_password_reset(&self, _email: &str, _redirect_to: &str) -> Result<(), AppError> {
        // The hosted service answers success even for unknown emails
        self.begin().await
    }

    async fn update_password(&self, access_token: &str, new_password: &str) -> Result<(), AppError> {
        self.begin().await?;

        let user_id = self.user_id_for(access_token)?;
        let mut entry = self
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::Backend("Invalid token".to_string()))?;
        entry.password = new_password.to_string();
        Ok(())
    }

    async fn query_records(&self, access_token: &str, user_id: Uuid) -> Result<Vec<Race>, AppError> {
        self.begin().await?;
        self.user_id_for(access_token)?;

        let mut races: Vec<Race> = self
            .races
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        races.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(races)
    }

    async fn insert_record(
        &self,
        access_token: &str,
        user_id: Uuid,
        race: &NewRace,
    ) -> Result<Race, AppError> {
        self.begin().await?;
        self.user_id_for(access_token)?;

        let stored = Self::materialize(Uuid::new_v4(), user_id, race);
        self.races.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_record(
        &self,
        access_token: &str,
        id: Uuid,
        race: &NewRace,
    ) -> Result<Race, AppError> {
        self.begin().await?;
        let user_id = self.user_id_for(access_token)?;

        match self.races.get_mut(&id) {
            Some(mut entry) if entry.user_id == user_id => {
                entry.name = race.name.clone();
                entry.date = race.date;
                entry.distance = race.distance;
                entry.race_type = race.race_type;
                entry.terrain_type = race.terrain_type;
                entry.is_completed = race.is_completed;
                // Absent optionals leave the stored value alone, matching
                // columns omitted from the hosted update body
                if let Some(time) = race.time {
                    entry.time = Some(time);
                }
                if let Some(gain) = race.elevation_gain {
                    entry.elevation_gain = Some(gain);
                }
                if let Some(position) = race.position {
                    entry.position = Some(position);
                }
                if let Some(notes) = &race.notes {
                    entry.notes = Some(notes.clone());
                }
                if let Some(location) = &race.location {
                    entry.location = Some(location.clone());
                }
                Ok(entry.value().clone())
            }
            // Single-object representation over zero matched rows
            _ => Err(AppError::Backend(
                "JSON object requested, multiple (or no) rows returned".to_string(),
            )),
        }
    }

    async fn delete_record(&self, access_token: &str, id: Uuid) -> Result<(), AppError> {
        self.begin().await?;
        let user_id = self.user_id_for(access_token)?;

        // Matching zero rows (absent id, someone else's row) is a success
        self.races.remove_if(&id, |_, race| race.user_id == user_id);
        Ok(())
    }

    async fn search_race_names(
        &self,
        access_token: &str,
        query: &str,
    ) -> Result<Vec<String>, AppError> {
        self.begin().await?;
        self.user_id_for(access_token)?;

        let needle = query.to_lowercase();
        let mut matches: Vec<(String, u32)> = self
            .race_names
            .iter()
            .filter(|entry| entry.key().to_lowercase().contains(&needle))
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();
        matches.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        Ok(matches.into_iter().take(5).map(|(name, _)| name).collect())
    }

    async fn upsert_race_name(&self, access_token: &str, name: &str) -> Result<(), AppError> {
        self.begin().await?;
        self.user_id_for(access_token)?;

        *self.race_names.entry(name.to_string()).or_insert(0) += 1;
        Ok(())
    }

    async fn race_history(&self, access_token: &str, name: &str) -> Result<Vec<Race>, AppError> {
        self.begin().await?;
        let user_id = self.user_id_for(access_token)?;

        let mut races: Vec<Race> = self
            .races
            .iter()
            .filter(|entry| entry.user_id == user_id && entry.name == name)
            .map(|entry| entry.value().clone())
            .collect();
        races.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(races)
    }
}
