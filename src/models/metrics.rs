//! Derived summary metrics over a user's race list.
//!
//! Metrics are recomputed on demand from the in-memory list; nothing here
//! is persisted or cached.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::race::{Race, RaceType, TerrainType};
use crate::time_utils::calculate_pace;

/// Completed-race counts per terrain category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct TerrainDistribution {
    pub road: u32,
    pub trail: u32,
    pub cross: u32,
    pub mtb: u32,
    pub gravel: u32,
    pub track: u32,
}

impl TerrainDistribution {
    fn tally(&mut self, terrain: TerrainType) {
        match terrain {
            TerrainType::Road => self.road += 1,
            TerrainType::Trail => self.trail += 1,
            TerrainType::Cross => self.cross += 1,
            TerrainType::Mtb => self.mtb += 1,
            TerrainType::Gravel => self.gravel += 1,
            TerrainType::Track => self.track += 1,
        }
    }

    /// Sum over all terrain categories.
    pub fn total(&self) -> u32 {
        self.road + self.trail + self.cross + self.mtb + self.gravel + self.track
    }
}

/// Completed-race counts per discipline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct RaceTypeDistribution {
    pub running: u32,
    pub cycling: u32,
}

/// The completed race with the lowest pace.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct FastestRace {
    pub race: Race,
    /// Minutes per kilometer
    pub pace: f64,
}

/// The completed race with the highest elevation gain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct HighestRace {
    pub race: Race,
    /// Meters of gain
    pub elevation: u32,
}

/// Summary statistics over the current race list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub total_races: u32,
    pub total_completed_races: u32,
    pub total_upcoming_races: u32,
    /// Kilometers, completed races only
    pub total_distance: f64,
    /// Seconds, completed races with a recorded time
    pub total_time: u64,
    /// Meters, completed races with a recorded gain
    pub total_elevation: u64,
    pub terrain_distribution: TerrainDistribution,
    pub race_type_distribution: RaceTypeDistribution,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fastest: Option<FastestRace>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest: Option<HighestRace>,
}

/// Compute summary metrics with a single pass over the list.
///
/// Completed races accumulate distance and terrain/discipline counts
/// unconditionally. A missing or zero time keeps a race out of the time
/// total and the fastest-pace comparison; likewise for elevation gain.
/// Comparisons are strict, so the first occurrence wins ties.
pub fn calculate_metrics(races: &[Race]) -> Metrics {
    let mut metrics = Metrics {
        total_races: races.len() as u32,
        ..Metrics::default()
    };

    let mut fastest: Option<(&Race, f64)> = None;
    let mut highest: Option<(&Race, u32)> = None;

    for race in races {
        if !race.is_completed {
            metrics.total_upcoming_races += 1;
            continue;
        }

        metrics.total_completed_races += 1;
        metrics.total_distance += race.distance;
        metrics.terrain_distribution.tally(race.terrain_type);
        match race.race_type {
            RaceType::Running => metrics.race_type_distribution.running += 1,
            RaceType::Cycling => metrics.race_type_distribution.cycling += 1,
        }

        match race.time {
            Some(time) if time > 0 => {
                metrics.total_time += u64::from(time);
                // Zero-distance races never enter the pace comparison
                if race.distance > 0.0 {
                    let pace = calculate_pace(time, race.distance);
                    if fastest.is_none_or(|(_, best)| pace < best) {
                        fastest = Some((race, pace));
                    }
                }
            }
            _ => {}
        }

        match race.elevation_gain {
            Some(gain) if gain > 0 => {
                metrics.total_elevation += u64::from(gain);
                if highest.is_none_or(|(_, best)| gain > best) {
                    highest = Some((race, gain));
                }
            }
            _ => {}
        }
    }

    metrics.fastest = fastest.map(|(race, pace)| FastestRace {
        race: race.clone(),
        pace,
    });
    metrics.highest = highest.map(|(race, elevation)| HighestRace {
        race: race.clone(),
        elevation,
    });

    metrics
}

// ─── Fun Facts ───────────────────────────────────────────────

/// Length of a soccer field in meters.
const SOCCER_FIELD_METERS: f64 = 105.0;
/// Height of Mount Everest in meters.
const EVEREST_METERS: f64 = 8848.0;
/// A two-hour movie, in seconds.
const MOVIE_SECONDS: f64 = 7200.0;

/// Playful equivalents of the raw totals for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct FunFacts {
    /// Total distance as soccer-field lengths
    pub soccer_fields: u64,
    /// Total elevation as Everest ascents, one decimal
    pub everest_climbs: f64,
    /// Total time as two-hour movies
    pub movies_watched: u64,
}

/// Derive the dashboard fun facts from computed metrics.
pub fn fun_facts(metrics: &Metrics) -> FunFacts {
    FunFacts {
        soccer_fields: (metrics.total_distance * 1000.0 / SOCCER_FIELD_METERS).round() as u64,
        everest_climbs: (metrics.total_elevation as f64 / EVEREST_METERS * 10.0).round() / 10.0,
        movies_watched: (metrics.total_time as f64 / MOVIE_SECONDS).round() as u64,
    }
}
