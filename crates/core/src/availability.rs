//! Availability marks: "resource R is available on day D at slot S".

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::time_slot::TimeSlot;
use crate::types::{Day, DbId};

/// Composite key of an availability mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AvailabilityKey {
    pub resource_id: DbId,
    pub day: Day,
    pub time_slot: TimeSlot,
}

/// One availability row, joined with the resource's display name.
///
/// Existence is the whole payload: a mark means "available".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityMark {
    pub resource_id: DbId,
    pub resource_name: String,
    pub day: Day,
    pub time_slot: TimeSlot,
}

impl AvailabilityMark {
    pub fn key(&self) -> AvailabilityKey {
        AvailabilityKey {
            resource_id: self.resource_id,
            day: self.day,
            time_slot: self.time_slot,
        }
    }
}

/// Constant-time availability lookup for a single day.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityIndex {
    marks: HashSet<(DbId, TimeSlot)>,
}

impl AvailabilityIndex {
    /// Index the marks of `day`; marks for other days are ignored.
    pub fn for_day(marks: &[AvailabilityMark], day: Day) -> Self {
        Self {
            marks: marks
                .iter()
                .filter(|m| m.day == day)
                .map(|m| (m.resource_id, m.time_slot))
                .collect(),
        }
    }

    pub fn is_available(&self, resource_id: DbId, slot: TimeSlot) -> bool {
        self.marks.contains(&(resource_id, slot))
    }
}

/// A single edit to the availability listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum AvailabilityOp {
    Add(AvailabilityMark),
    Remove(AvailabilityKey),
}

impl AvailabilityOp {
    pub fn key(&self) -> AvailabilityKey {
        match self {
            AvailabilityOp::Add(mark) => mark.key(),
            AvailabilityOp::Remove(key) => *key,
        }
    }

    pub fn day(&self) -> Day {
        self.key().day
    }

    /// Apply the edit to a listing. Adding an existing key and removing a
    /// missing key are both no-ops; new marks go to the end of the listing.
    pub fn apply(&self, marks: &mut Vec<AvailabilityMark>) {
        match self {
            AvailabilityOp::Add(mark) => {
                if !marks.iter().any(|m| m.key() == mark.key()) {
                    marks.push(mark.clone());
                }
            }
            AvailabilityOp::Remove(key) => marks.retain(|m| m.key() != *key),
        }
    }
}
