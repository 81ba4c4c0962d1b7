// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Countdown to the next planned race.
//!
//! A race "starts" at midnight UTC on its date. Races whose start has
//! already passed never produce a countdown, so the dashboard drops the
//! widget instead of rendering a zeroed clock.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::race::Race;

/// Remaining time until a race start, broken into display units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct TimeRemaining {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

/// The next planned race together with the time left until it starts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Countdown {
    pub race: Race,
    pub remaining: TimeRemaining,
}

fn start_instant(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Time left until midnight UTC on `date`, or `None` once it has passed.
pub fn time_remaining(date: NaiveDate, now: DateTime<Utc>) -> Option<TimeRemaining> {
    let secs = (start_instant(date) - now).num_seconds();
    if secs <= 0 {
        return None;
    }

    Some(TimeRemaining {
        days: secs / 86_400,
        hours: (secs % 86_400) / 3_600,
        minutes: (secs % 3_600) / 60,
        seconds: secs % 60,
    })
}

/// The not-yet-started planned race with the earliest date.
///
/// Ties keep the first race in list order.
pub fn next_upcoming(races: &[Race], now: DateTime<Utc>) -> Option<&Race> {
    races
        .iter()
        .filter(|race| !race.is_completed && start_instant(race.date) > now)
        .min_by_key(|race| race.date)
}

/// Countdown for the dashboard, absent when nothing is planned ahead.
pub fn next_countdown(races: &[Race], now: DateTime<Utc>) -> Option<Countdown> {
    let race = next_upcoming(races, now)?;
    let remaining = time_remaining(race.date, now)?;
    Some(Countdown {
        race: race.clone(),
        remaining,
    })
}
