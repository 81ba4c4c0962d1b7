// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod metrics;
pub mod race;
pub mod user;

pub use metrics::{FunFacts, Metrics};
pub use race::{NewRace, Race, RaceDraft, RaceType, TerrainType};
pub use user::User;
