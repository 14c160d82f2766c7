//! Caller-side draft of a recurring event.
//!
//! The window, spec, and exclusions are the only source of truth; occurrence
//! lists are always derived from them and never stored.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::exclusion::ExclusionSet;
use crate::expander::{self, GeneratedOccurrence, OccurrenceId};
use crate::spec::{update_spec, RecurrenceSpec, SpecPatch};
use crate::window::EventWindow;

/// Everything the event-creation form holds while the user edits a series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceDraft {
    pub window: EventWindow,
    #[serde(default)]
    pub spec: RecurrenceSpec,
    #[serde(default)]
    pub exclusions: ExclusionSet,
}

impl RecurrenceDraft {
    pub fn new(window: EventWindow, spec: RecurrenceSpec) -> Self {
        Self {
            window,
            spec,
            exclusions: ExclusionSet::new(),
        }
    }

    /// Apply a spec edit. Switching the recurrence kind clears all exclusions
    /// in the same step.
    ///
    /// Returns whether the kind changed.
    pub fn apply_patch(&mut self, patch: &SpecPatch) -> bool {
        let update = update_spec(&self.spec, patch);
        if update.kind_changed {
            tracing::debug!(
                from = ?self.spec.kind,
                to = ?update.spec.kind,
                cleared = self.exclusions.len(),
                "Recurrence kind changed, clearing exclusions"
            );
            self.exclusions.clear();
        }
        self.spec = update.spec;
        update.kind_changed
    }

    /// Replace the base window. Exclusions are kept.
    pub fn set_window(&mut self, window: EventWindow) {
        self.window = window;
    }

    pub fn exclude(&mut self, id: &OccurrenceId) {
        self.exclusions = self.exclusions.exclude(id);
    }

    pub fn restore(&mut self, id: &OccurrenceId) {
        self.exclusions = self.exclusions.restore(id);
    }

    pub fn toggle(&mut self, id: &OccurrenceId) {
        self.exclusions = self.exclusions.toggle(id);
    }

    /// Occurrences to show in the calendar preview; empty if the draft is not
    /// currently expandable.
    pub fn preview(&self) -> Vec<GeneratedOccurrence> {
        expander::materialize_or_empty(&self.window, &self.spec, &self.exclusions)
    }

    /// Occurrences to persist, base occurrence first.
    ///
    /// # Errors
    /// See [`expander::final_occurrences`].
    pub fn finalize(&self) -> Result<Vec<GeneratedOccurrence>> {
        expander::final_occurrences(&self.window, &self.spec, &self.exclusions)
    }

    /// Start instants to persist, base occurrence first.
    ///
    /// # Errors
    /// See [`expander::final_date_list`].
    pub fn final_date_list(&self) -> Result<Vec<NaiveDateTime>> {
        expander::final_date_list(&self.window, &self.spec, &self.exclusions)
    }
}
