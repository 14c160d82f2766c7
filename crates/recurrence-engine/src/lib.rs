//! # recurrence-engine
//!
//! Deterministic recurring-event date generation for the team calendar.
//!
//! Given a base event window (date, start/end time of day, optional arrival
//! time) and a recurrence specification, the engine produces the concrete,
//! chronologically ordered set of occurrences, applies caller-chosen
//! exclusions, and builds the final list handed to persistence on save.
//! Calendar arithmetic is delegated to the `rrule` crate; every instant is
//! timezone-naive.
//!
//! ## Modules
//!
//! - [`window`] — base event window, time-of-day parsing, duration and arrival lead time
//! - [`spec`] — recurrence specification, patches, and translation to RFC 5545 rules
//! - [`expander`] — instant generation, materialization, and the final save list
//! - [`exclusion`] — per-occurrence exclusion set
//! - [`draft`] — caller-side state record that keeps spec edits and exclusions in step
//! - [`error`] — Error types

pub mod draft;
pub mod error;
pub mod exclusion;
pub mod expander;
pub mod spec;
pub mod window;

pub use draft::RecurrenceDraft;
pub use error::EngineError;
pub use exclusion::ExclusionSet;
pub use expander::{
    final_date_list, final_occurrences, generate_occurrence_instants, materialize,
    materialize_or_empty, GeneratedOccurrence, OccurrenceId, SAFETY_CAP,
};
pub use spec::{update_spec, RecurrenceKind, RecurrenceSpec, SpecPatch, SpecUpdate, Terminator};
pub use window::{compute_duration, lead_time, EventWindow};
