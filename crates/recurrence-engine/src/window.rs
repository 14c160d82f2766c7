//! Base event window -- the anchor occurrence the user edits directly.
//!
//! Times of day arrive as form strings ("09:00", "09:00:00") and are parsed
//! lazily so that a half-typed value degrades to "no occurrences" instead of
//! failing the whole draft.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Accepted time-of-day formats, tried in order.
const TIME_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];

/// The base occurrence: a calendar date plus start/end times of day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventWindow {
    pub base_date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    /// Time of day participants should arrive before the start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<String>,
}

impl EventWindow {
    pub fn new(
        base_date: NaiveDate,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
    ) -> Self {
        Self {
            base_date,
            start_time: start_time.into(),
            end_time: end_time.into(),
            arrival_time: None,
        }
    }

    pub fn with_arrival(mut self, arrival_time: impl Into<String>) -> Self {
        self.arrival_time = Some(arrival_time.into());
        self
    }

    /// Start of the base occurrence.
    pub fn start_datetime(&self) -> Result<NaiveDateTime> {
        Ok(self.base_date.and_time(parse_time_of_day(&self.start_time)?))
    }

    /// End of the base occurrence, on the base date (no midnight wrap).
    pub fn end_datetime(&self) -> Result<NaiveDateTime> {
        Ok(self.base_date.and_time(parse_time_of_day(&self.end_time)?))
    }
}

/// Parse a time-of-day string such as "09:00" or "17:30:00".
///
/// # Errors
/// Returns `EngineError::InvalidTimeFormat` if no accepted format matches.
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime> {
    let trimmed = s.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| EngineError::InvalidTimeFormat(s.to_string()))
}

/// Compute the duration of the base window: `end(base_date) - start(base_date)`.
///
/// The same duration is applied to every generated occurrence.
///
/// # Errors
/// Returns `EngineError::InvalidTimeFormat` if either time is unparseable.
/// Returns `EngineError::InvalidWindow` if the end precedes the start.
pub fn compute_duration(window: &EventWindow) -> Result<Duration> {
    let start = window.start_datetime()?;
    let end = window.end_datetime()?;
    let duration = end - start;

    if duration < Duration::zero() {
        return Err(EngineError::InvalidWindow(format!(
            "end time {} precedes start time {}",
            window.end_time, window.start_time
        )));
    }

    Ok(duration)
}

/// How long before the start participants should arrive, if an arrival time is set.
///
/// An arrival time of day later than the start time of day means the arrival
/// falls on the previous day (e.g. arrive 23:30 for a 00:30 start is one hour).
///
/// # Errors
/// Returns `EngineError::InvalidTimeFormat` if the arrival or start time is unparseable.
pub fn lead_time(window: &EventWindow) -> Result<Option<Duration>> {
    let Some(arrival) = window.arrival_time.as_deref() else {
        return Ok(None);
    };

    let arrival = parse_time_of_day(arrival)?;
    let start = parse_time_of_day(&window.start_time)?;

    let mut lead = start - arrival;
    if lead < Duration::zero() {
        // Wraps across midnight.
        lead += Duration::days(1);
    }

    Ok(Some(lead))
}
