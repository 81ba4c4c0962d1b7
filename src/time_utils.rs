// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Race time and pace helpers.
//!
//! Times are stored as whole seconds and displayed as `HH:MM:SS`;
//! pace is minutes per kilometer, displayed as `M:SS`.

/// Error parsing a `HH:MM:SS` time string.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TimeParseError {
    #[error("expected three ':'-separated segments, got {0}")]
    SegmentCount(usize),

    #[error("non-numeric time segment: {0:?}")]
    BadSegment(String),

    #[error("time out of range: {0:?}")]
    OutOfRange(String),
}

/// Format a duration in seconds as zero-padded `HH:MM:SS`.
pub fn format_time(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// Parse a `HH:MM:SS` string into seconds.
///
/// Rejects input without exactly three numeric segments, and totals that
/// do not fit in `u32` seconds. Out-of-range minutes or seconds are
/// otherwise summed rather than rejected, so "00:90:00" parses to the
/// same value as "01:30:00".
pub fn parse_time(input: &str) -> Result<u32, TimeParseError> {
    let segments: Vec<&str> = input.split(':').collect();
    if segments.len() != 3 {
        return Err(TimeParseError::SegmentCount(segments.len()));
    }

    let mut parts = [0u32; 3];
    for (slot, segment) in parts.iter_mut().zip(&segments) {
        *slot = segment
            .trim()
            .parse()
            .map_err(|_| TimeParseError::BadSegment(segment.to_string()))?;
    }

    parts[0]
        .checked_mul(3600)
        .and_then(|total| total.checked_add(parts[1].checked_mul(60)?))
        .and_then(|total| total.checked_add(parts[2]))
        .ok_or_else(|| TimeParseError::OutOfRange(input.to_string()))
}

/// Pace in minutes per kilometer.
///
/// Zero distance is rejected at the form boundary; callers must not pass it.
pub fn calculate_pace(time_seconds: u32, distance_km: f64) -> f64 {
    time_seconds as f64 / 60.0 / distance_km
}

/// Format a pace as `M:SS` with rounded seconds.
pub fn format_pace(pace: f64) -> String {
    let mut minutes = pace.floor() as u32;
    let mut seconds = ((pace - pace.floor()) * 60.0).round() as u32;
    // Rounding can produce 60 seconds; carry instead of printing "4:60"
    if seconds == 60 {
        minutes += 1;
        seconds = 0;
    }
    format!("{}:{:02}", minutes, seconds)
}
