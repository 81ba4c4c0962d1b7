// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Race record model: API shape, hosted-backend row shape, and the
//! translation between them.
//!
//! The hosted backend stores snake_case columns with the finishing
//! position flattened into three nullable integer columns; the API speaks
//! camelCase with a nested optional `position` object.

use crate::time_utils::parse_time;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

/// Race surface category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum TerrainType {
    Road,
    Trail,
    Cross,
    Mtb,
    Gravel,
    Track,
}

/// Sport discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum RaceType {
    Running,
    Cycling,
}

/// Finishing position triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// Overall rank
    pub general: u32,
    /// Rank within age group
    pub age_group: u32,
    /// Rank within gender
    pub gender: u32,
}

/// A race record, completed or upcoming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Race {
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    pub name: String,
    /// Race day (calendar date, no time component)
    pub date: NaiveDate,
    /// Distance in kilometers
    pub distance: f64,
    pub race_type: RaceType,
    pub terrain_type: TerrainType,
    /// Elapsed time in seconds (completed races)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<u32>,
    /// Elevation gain in meters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation_gain: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    pub is_completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

// ─── Wire Rows ───────────────────────────────────────────────

/// Row shape returned by the hosted backend (snake_case columns).
#[derive(Debug, Clone, Deserialize)]
pub struct RaceRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub date: NaiveDate,
    pub distance: f64,
    pub race_type: RaceType,
    pub terrain_type: TerrainType,
    pub time: Option<u32>,
    pub elevation_gain: Option<u32>,
    pub position_general: Option<u32>,
    pub position_age_group: Option<u32>,
    pub position_gender: Option<u32>,
    pub is_completed: bool,
    pub notes: Option<String>,
    pub location: Option<String>,
}

impl From<RaceRow> for Race {
    fn from(row: RaceRow) -> Self {
        // A zero or null overall rank means no position was recorded
        let position = match row.position_general {
            Some(general) if general > 0 => Some(Position {
                general,
                age_group: row.position_age_group.unwrap_or(0),
                gender: row.position_gender.unwrap_or(0),
            }),
            _ => None,
        };

        Race {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            date: row.date,
            distance: row.distance,
            race_type: row.race_type,
            terrain_type: row.terrain_type,
            time: row.time,
            elevation_gain: row.elevation_gain,
            position,
            is_completed: row.is_completed,
            notes: row.notes,
            location: row.location,
        }
    }
}

/// Row body sent to the hosted backend on insert/update.
///
/// Absent optional fields are omitted from the JSON body rather than sent
/// as null, so an update never clears columns the form left untouched.
#[derive(Debug, Clone, Serialize)]
pub struct RaceWriteRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    pub name: String,
    pub date: NaiveDate,
    pub distance: f64,
    pub race_type: RaceType,
    pub terrain_type: TerrainType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation_gain: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_general: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_age_group: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_gender: Option<u32>,
    pub is_completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl RaceWriteRow {
    /// Build an insert body (sets the owning user).
    pub fn insert(user_id: Uuid, draft: &NewRace) -> Self {
        let mut row = Self::update(draft);
        row.user_id = Some(user_id);
        row
    }

    /// Build an update body (the owning user is never rewritten).
    pub fn update(draft: &NewRace) -> Self {
        Self {
            user_id: None,
            name: draft.name.clone(),
            date: draft.date,
            distance: draft.distance,
            race_type: draft.race_type,
            terrain_type: draft.terrain_type,
            time: draft.time,
            elevation_gain: draft.elevation_gain,
            position_general: draft.position.map(|p| p.general),
            position_age_group: draft.position.map(|p| p.age_group),
            position_gender: draft.position.map(|p| p.gender),
            is_completed: draft.is_completed,
            notes: draft.notes.clone(),
            location: draft.location.clone(),
        }
    }
}

// ─── Form Drafts ─────────────────────────────────────────────

/// Race form payload as submitted by the frontend.
///
/// Time arrives as the raw `hh:mm:ss` form input; validation rejects
/// malformed strings before they reach the backend.
#[derive(Debug, Clone, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct RaceDraft {
    #[validate(length(min = 1, message = "Race name is required"))]
    pub name: String,
    pub date: NaiveDate,
    /// Distance in kilometers
    #[validate(range(exclusive_min = 0.0, message = "Distance must be positive"))]
    pub distance: f64,
    pub race_type: RaceType,
    pub terrain_type: TerrainType,
    /// Elapsed time as `hh:mm:ss`; empty or absent for upcoming races
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub elevation_gain: Option<u32>,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl RaceDraft {
    /// Run the derive rules plus the time-format check.
    pub fn check(&self) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(e) => e,
        };

        if let Some(time) = self.time.as_deref() {
            if !time.is_empty() && parse_time(time).is_err() {
                let mut err = ValidationError::new("time_format");
                err.message = Some("Invalid time format (use hh:mm:ss)".into());
                errors.add("time".into(), err);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Convert a validated draft into the typed backend shape.
    pub fn into_new_race(self) -> NewRace {
        let time = self
            .time
            .as_deref()
            .filter(|t| !t.is_empty())
            .and_then(|t| parse_time(t).ok());

        NewRace {
            name: self.name,
            date: self.date,
            distance: self.distance,
            race_type: self.race_type,
            terrain_type: self.terrain_type,
            time,
            elevation_gain: self.elevation_gain,
            position: self.position,
            is_completed: self.is_completed,
            notes: self.notes,
            location: self.location,
        }
    }
}

/// A validated race draft with the time resolved to seconds.
#[derive(Debug, Clone)]
pub struct NewRace {
    pub name: String,
    pub date: NaiveDate,
    pub distance: f64,
    pub race_type: RaceType,
    pub terrain_type: TerrainType,
    pub time: Option<u32>,
    pub elevation_gain: Option<u32>,
    pub position: Option<Position>,
    pub is_completed: bool,
    pub notes: Option<String>,
    pub location: Option<String>,
}
