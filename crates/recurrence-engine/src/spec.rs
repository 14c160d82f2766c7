//! Recurrence specification and patch merging.
//!
//! A [`RecurrenceSpec`] is a caller-owned value re-created on every edit. It is
//! translated into RFC 5545 `DTSTART`/`RRULE` text for the `rrule` crate by
//! [`RecurrenceSpec::rrule_text`].

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{EngineError, Result};

/// Occurrence count used when a spec is created without an explicit terminator.
pub const DEFAULT_COUNT: u32 = 10;

/// Recurrence frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceKind {
    /// Single occurrence, the base window itself.
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

/// Rule that stops generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terminator {
    /// Stop after this many instants, counting the base occurrence.
    ByCount(u32),
    /// Stop after the last instant falling on or before this date.
    ByDate(NaiveDate),
}

impl Default for Terminator {
    fn default() -> Self {
        Terminator::ByCount(DEFAULT_COUNT)
    }
}

/// How an event repeats.
///
/// `weekdays` only applies to [`RecurrenceKind::Weekly`] and `month_day` only to
/// [`RecurrenceKind::Monthly`]; everything except `kind` is ignored for
/// [`RecurrenceKind::None`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecurrenceSpec {
    pub kind: RecurrenceKind,
    /// Every N days/weeks/months. Must be at least 1.
    pub interval: u32,
    pub terminator: Terminator,
    /// Weekly days. Must not be empty; the base date's weekday always recurs too.
    pub weekdays: Vec<Weekday>,
    /// Day of month for monthly rules. Falls back to the base date's day.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month_day: Option<u32>,
}

impl Default for RecurrenceSpec {
    fn default() -> Self {
        Self {
            kind: RecurrenceKind::None,
            interval: 1,
            terminator: Terminator::default(),
            weekdays: Vec::new(),
            month_day: None,
        }
    }
}

impl RecurrenceSpec {
    /// A non-recurring spec.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn daily(interval: u32, terminator: Terminator) -> Self {
        Self {
            kind: RecurrenceKind::Daily,
            interval,
            terminator,
            ..Self::default()
        }
    }

    pub fn weekly(interval: u32, weekdays: Vec<Weekday>, terminator: Terminator) -> Self {
        Self {
            kind: RecurrenceKind::Weekly,
            interval,
            terminator,
            weekdays,
            ..Self::default()
        }
    }

    pub fn monthly(interval: u32, month_day: Option<u32>, terminator: Terminator) -> Self {
        Self {
            kind: RecurrenceKind::Monthly,
            interval,
            terminator,
            month_day,
            ..Self::default()
        }
    }

    /// Check that the spec describes a schedule the engine can generate.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidRecurrenceSpec` for a zero or oversized
    /// interval, `ByCount(0)`, an end date before `base_date`, a weekly rule
    /// with no weekdays, or a month day outside 1..=31.
    pub fn validate(&self, base_date: NaiveDate) -> Result<()> {
        if self.kind == RecurrenceKind::None {
            return Ok(());
        }

        if self.interval == 0 {
            return Err(invalid("interval must be at least 1"));
        }
        if self.interval > u32::from(u16::MAX) {
            return Err(invalid(format!("interval {} is too large", self.interval)));
        }

        match self.terminator {
            Terminator::ByCount(0) => return Err(invalid("occurrence count must be at least 1")),
            Terminator::ByDate(end) if end < base_date => {
                return Err(invalid(format!(
                    "end date {} precedes base date {}",
                    end, base_date
                )));
            }
            _ => {}
        }

        match self.kind {
            RecurrenceKind::Weekly if self.weekdays.is_empty() => {
                Err(invalid("weekly recurrence needs at least one weekday"))
            }
            RecurrenceKind::Monthly => match self.month_day {
                Some(day) if !(1..=31).contains(&day) => {
                    Err(invalid(format!("month day {} is outside 1..=31", day)))
                }
                _ => Ok(()),
            },
            _ => Ok(()),
        }
    }

    /// Build the iCalendar `DTSTART` + `RRULE` text for this spec anchored at `dtstart`.
    ///
    /// Returns `None` for [`RecurrenceKind::None`]. The instant is written as
    /// UTC so that `rrule` never applies an offset to naive local times.
    /// Assumes the spec has passed [`RecurrenceSpec::validate`].
    pub fn rrule_text(&self, dtstart: NaiveDateTime) -> Option<String> {
        let freq = match self.kind {
            RecurrenceKind::None => return None,
            RecurrenceKind::Daily => "DAILY",
            RecurrenceKind::Weekly => "WEEKLY",
            RecurrenceKind::Monthly => "MONTHLY",
        };

        let mut parts = vec![
            format!("FREQ={}", freq),
            format!("INTERVAL={}", self.interval),
            "WKST=MO".to_string(),
        ];

        match self.kind {
            RecurrenceKind::Weekly => {
                // The base weekday is always part of the set.
                let mut days = self.weekdays.clone();
                days.push(dtstart.weekday());
                days.sort_by_key(|d| d.num_days_from_monday());
                days.dedup();
                let codes: Vec<&str> = days.into_iter().map(weekday_code).collect();
                parts.push(format!("BYDAY={}", codes.join(",")));
            }
            RecurrenceKind::Monthly => {
                let day = self.month_day.unwrap_or_else(|| dtstart.day());
                parts.push(format!("BYMONTHDAY={}", day));
            }
            _ => {}
        }

        match self.terminator {
            Terminator::ByCount(count) => parts.push(format!("COUNT={}", count)),
            // Inclusive of every instant on the end date.
            Terminator::ByDate(end) => parts.push(format!("UNTIL={}T235959Z", end.format("%Y%m%d"))),
        }

        Some(format!(
            "DTSTART:{}\nRRULE:{}",
            dtstart.format("%Y%m%dT%H%M%SZ"),
            parts.join(";")
        ))
    }
}

fn invalid(reason: impl Into<String>) -> EngineError {
    EngineError::InvalidRecurrenceSpec(reason.into())
}

fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

/// Partial edit of a [`RecurrenceSpec`]. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecPatch {
    pub kind: Option<RecurrenceKind>,
    pub interval: Option<u32>,
    pub terminator: Option<Terminator>,
    pub weekdays: Option<Vec<Weekday>>,
    /// `Some(None)` clears the month day; JSON `null` maps to that.
    #[serde(deserialize_with = "double_option")]
    pub month_day: Option<Option<u32>>,
}

impl SpecPatch {
    pub fn with_kind(mut self, kind: RecurrenceKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn with_terminator(mut self, terminator: Terminator) -> Self {
        self.terminator = Some(terminator);
        self
    }

    pub fn with_weekdays(mut self, weekdays: Vec<Weekday>) -> Self {
        self.weekdays = Some(weekdays);
        self
    }

    pub fn with_month_day(mut self, month_day: Option<u32>) -> Self {
        self.month_day = Some(month_day);
        self
    }
}

fn double_option<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Result of merging a [`SpecPatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecUpdate {
    pub spec: RecurrenceSpec,
    /// The patch switched the recurrence kind. Any exclusion set kept
    /// alongside the spec must be cleared in the same step.
    pub kind_changed: bool,
}

/// Merge `patch` onto `current`.
///
/// Occurrence identities from different kinds are not comparable, so callers
/// holding exclusions must clear them when `kind_changed` is set.
/// [`crate::RecurrenceDraft::apply_patch`] does both at once.
pub fn update_spec(current: &RecurrenceSpec, patch: &SpecPatch) -> SpecUpdate {
    let kind_changed = patch.kind.is_some_and(|kind| kind != current.kind);

    let spec = RecurrenceSpec {
        kind: patch.kind.unwrap_or(current.kind),
        interval: patch.interval.unwrap_or(current.interval),
        terminator: patch.terminator.unwrap_or(current.terminator),
        weekdays: patch
            .weekdays
            .clone()
            .unwrap_or_else(|| current.weekdays.clone()),
        month_day: patch.month_day.unwrap_or(current.month_day),
    };

    SpecUpdate { spec, kind_changed }
}
