// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! RaceTrack: log races you've run, plan the ones ahead
//!
//! This crate provides the backend API for a personal race journal:
//! password sessions, race records with aggregate statistics, and the
//! page views the frontend renders, all fronting a hosted identity +
//! row storage platform.

pub mod backend;
pub mod config;
pub mod countdown;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod stores;
pub mod time_utils;

use std::sync::Arc;
use uuid::Uuid;

use backend::RaceBackend;
use config::Config;
use error::{AppError, Result};
use stores::{SessionRegistry, UserSession};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub backend: Arc<dyn RaceBackend>,
    pub sessions: SessionRegistry,
}

impl AppState {
    /// The caller's session containers. Answers Unauthorized once the
    /// registry no longer holds them, even if the cookie is still valid.
    pub fn session(&self, user_id: Uuid) -> Result<Arc<UserSession>> {
        self.sessions.get(user_id).ok_or(AppError::Unauthorized)
    }
}
