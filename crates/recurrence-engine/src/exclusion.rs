//! Per-occurrence exclusions.
//!
//! Updates return a new set so callers can keep the previous value; the set is
//! small (bounded by the safety cap) so cloning is cheap.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::expander::OccurrenceId;

/// Identities of generated occurrences the user chose to drop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExclusionSet(BTreeSet<OccurrenceId>);

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclude `id`. Excluding an already excluded identity is a no-op.
    pub fn exclude(&self, id: &OccurrenceId) -> Self {
        let mut next = self.clone();
        next.0.insert(id.clone());
        next
    }

    /// Bring `id` back. Restoring an identity that is not excluded is a no-op.
    pub fn restore(&self, id: &OccurrenceId) -> Self {
        let mut next = self.clone();
        next.0.remove(id);
        next
    }

    /// Flip the exclusion state of `id`.
    pub fn toggle(&self, id: &OccurrenceId) -> Self {
        if self.contains(id) {
            self.restore(id)
        } else {
            self.exclude(id)
        }
    }

    pub fn contains(&self, id: &OccurrenceId) -> bool {
        self.0.contains(id)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OccurrenceId> {
        self.0.iter()
    }
}

impl FromIterator<OccurrenceId> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = OccurrenceId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
