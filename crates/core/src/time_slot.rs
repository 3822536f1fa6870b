//! The eight fixed daily take-off times.
//!
//! Availability marks and bookings are keyed by one of these slots. The
//! store persists them as their display string (`"9:45"`), so parsing is
//! strict: anything outside the fixed list is a validation error.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// One of the fixed daily time slots, in chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimeSlot {
    T0730,
    T0830,
    T0945,
    T1100,
    T1230,
    T1400,
    T1530,
    T1645,
}

impl TimeSlot {
    /// All slots in display order.
    pub const ALL: [TimeSlot; 8] = [
        TimeSlot::T0730,
        TimeSlot::T0830,
        TimeSlot::T0945,
        TimeSlot::T1100,
        TimeSlot::T1230,
        TimeSlot::T1400,
        TimeSlot::T1530,
        TimeSlot::T1645,
    ];

    /// Number of slots in a day.
    pub const COUNT: usize = Self::ALL.len();

    /// The string form used by the store and the UI.
    pub fn as_str(self) -> &'static str {
        match self {
            TimeSlot::T0730 => "7:30",
            TimeSlot::T0830 => "8:30",
            TimeSlot::T0945 => "9:45",
            TimeSlot::T1100 => "11:00",
            TimeSlot::T1230 => "12:30",
            TimeSlot::T1400 => "14:00",
            TimeSlot::T1530 => "15:30",
            TimeSlot::T1645 => "16:45",
        }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeSlot {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        // Some historical rows carry a zero-padded hour ("07:30").
        let normalized = trimmed.strip_prefix('0').unwrap_or(trimmed);
        TimeSlot::ALL
            .into_iter()
            .find(|slot| slot.as_str() == normalized)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid time slot '{s}'. Must be one of: {}",
                    TimeSlot::ALL.map(TimeSlot::as_str).join(", ")
                ))
            })
    }
}

impl Serialize for TimeSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TimeSlot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
