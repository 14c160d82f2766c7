//! Occurrence expansion -- turns a base window and a recurrence spec into
//! concrete occurrences.
//!
//! Calendar arithmetic is delegated to the `rrule` crate. Instants are
//! timezone-naive: they are pinned to UTC while inside `rrule` and converted
//! straight back, so no DST shift can ever apply.

use std::fmt;
use std::iter;

use chrono::{Duration, NaiveDateTime};
use rrule::RRuleSet;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::exclusion::ExclusionSet;
use crate::spec::{RecurrenceSpec, Terminator};
use crate::window::{compute_duration, lead_time, EventWindow};

/// Upper bound on generated instants regardless of the terminator.
///
/// Hitting the cap is not an error: the series is silently truncated so that a
/// far-away end date with a daily rule cannot produce an unbounded preview.
pub const SAFETY_CAP: u16 = 100;

const IDENTITY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Stable key of an occurrence: the ISO 8601 string of its start instant.
///
/// Exclusions are keyed by this rather than by position so they survive
/// reordering and interval edits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OccurrenceId(String);

impl OccurrenceId {
    pub fn from_instant(start: NaiveDateTime) -> Self {
        Self(start.format(IDENTITY_FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OccurrenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OccurrenceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for OccurrenceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A single concrete occurrence. Recomputed on every edit, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedOccurrence {
    pub id: OccurrenceId,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival: Option<NaiveDateTime>,
}

impl GeneratedOccurrence {
    fn new(start: NaiveDateTime, duration: Duration, lead: Option<Duration>) -> Result<Self> {
        let end = start
            .checked_add_signed(duration)
            .ok_or_else(|| out_of_range("end", start))?;
        let arrival = lead
            .map(|lead| {
                start
                    .checked_sub_signed(lead)
                    .ok_or_else(|| out_of_range("arrival", start))
            })
            .transpose()?;

        Ok(Self {
            id: OccurrenceId::from_instant(start),
            start,
            end,
            arrival,
        })
    }
}

fn out_of_range(what: &str, start: NaiveDateTime) -> EngineError {
    EngineError::InvalidWindow(format!(
        "{} of occurrence starting {} is out of the supported date range",
        what, start
    ))
}

/// Generate the start instants of a series anchored at `base`.
///
/// - The first instant is always `base` itself, whether or not the rule
///   matches it (e.g. a monthly day other than the base day).
/// - `None` yields exactly `[base]`.
/// - `Daily` / `Weekly` / `Monthly` follow RFC 5545: weekly instants are emitted
///   Mon..Sun within each week and never before `base`; monthly rules skip
///   months that lack the target day rather than clamping.
/// - `ByCount(n)` stops after `n` instants including `base`, `ByDate(d)`
///   includes every instant on `d`.
/// - At most [`SAFETY_CAP`] instants are returned.
///
/// The result is sorted and free of duplicates.
///
/// # Errors
/// Returns `EngineError::InvalidRecurrenceSpec` if the spec fails validation.
/// Returns `EngineError::Expansion` if `rrule` rejects the generated rule.
pub fn generate_occurrence_instants(
    base: NaiveDateTime,
    spec: &RecurrenceSpec,
) -> Result<Vec<NaiveDateTime>> {
    if let Err(e) = spec.validate(base.date()) {
        tracing::debug!(kind = ?spec.kind, error = %e, "Refusing to expand recurrence");
        return Err(e);
    }

    let Some(rrule_text) = spec.rrule_text(base) else {
        return Ok(vec![base]);
    };

    let rrule_set: RRuleSet = rrule_text
        .parse()
        .map_err(|e| EngineError::Expansion(format!("{}", e)))?;

    let result = rrule_set.all(SAFETY_CAP);
    if result.limited {
        tracing::debug!(
            "Recurrence expansion from {} stopped at {} instants",
            base,
            result.dates.len()
        );
    }

    let mut instants: Vec<NaiveDateTime> = result
        .dates
        .into_iter()
        .map(|dt| dt.naive_utc())
        .collect();

    instants.sort();
    instants.dedup();

    // The base anchors the series even when the rule does not land on it.
    if instants.first() != Some(&base) {
        instants.insert(0, base);
        let limit = match spec.terminator {
            Terminator::ByCount(count) => usize::try_from(count).unwrap_or(usize::MAX),
            Terminator::ByDate(_) => usize::MAX,
        };
        instants.truncate(limit.min(usize::from(SAFETY_CAP)));
    }

    Ok(instants)
}

/// Expand the window into occurrences, dropping any whose identity is excluded.
///
/// Every occurrence lasts as long as the base window. The result is in
/// chronological order.
///
/// # Errors
/// Propagates `InvalidTimeFormat` / `InvalidWindow` from the window and the
/// errors of [`generate_occurrence_instants`].
pub fn materialize(
    window: &EventWindow,
    spec: &RecurrenceSpec,
    exclusions: &ExclusionSet,
) -> Result<Vec<GeneratedOccurrence>> {
    let duration = compute_duration(window)?;
    let lead = lead_time(window)?;
    let base = window.start_datetime()?;

    let mut occurrences: Vec<GeneratedOccurrence> = generate_occurrence_instants(base, spec)?
        .into_iter()
        .map(|start| GeneratedOccurrence::new(start, duration, lead))
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .filter(|occurrence| !exclusions.contains(&occurrence.id))
        .collect();

    occurrences.sort_by_key(|occurrence| occurrence.start);

    Ok(occurrences)
}

/// [`materialize`], degrading any error to an empty preview.
pub fn materialize_or_empty(
    window: &EventWindow,
    spec: &RecurrenceSpec,
    exclusions: &ExclusionSet,
) -> Vec<GeneratedOccurrence> {
    materialize(window, spec, exclusions).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "No occurrences producible for draft");
        Vec::new()
    })
}

/// Occurrences to persist on save.
///
/// The base occurrence (generated element 0) is always first, even if its
/// identity is in `exclusions`; the rest of the generated series follows with
/// exclusions applied.
///
/// # Errors
/// Same as [`materialize`].
pub fn final_occurrences(
    window: &EventWindow,
    spec: &RecurrenceSpec,
    exclusions: &ExclusionSet,
) -> Result<Vec<GeneratedOccurrence>> {
    let duration = compute_duration(window)?;
    let lead = lead_time(window)?;
    let base_start = window.start_datetime()?;
    let base = GeneratedOccurrence::new(base_start, duration, lead)?;

    let mut tail = Vec::new();
    for start in generate_occurrence_instants(base_start, spec)?.into_iter().skip(1) {
        let occurrence = GeneratedOccurrence::new(start, duration, lead)?;
        if !exclusions.contains(&occurrence.id) {
            tail.push(occurrence);
        }
    }

    Ok(iter::once(base).chain(tail).collect())
}

/// Start instants of [`final_occurrences`].
///
/// # Errors
/// Same as [`materialize`].
pub fn final_date_list(
    window: &EventWindow,
    spec: &RecurrenceSpec,
    exclusions: &ExclusionSet,
) -> Result<Vec<NaiveDateTime>> {
    Ok(final_occurrences(window, spec, exclusions)?
        .into_iter()
        .map(|occurrence| occurrence.start)
        .collect())
}
