//! Grid columns derived from the day's availability listing.

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::availability::AvailabilityMark;
use crate::error::CoreError;
use crate::types::DbId;

/// A bookable pilot/vehicle, rendered as one grid column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resource {
    pub id: DbId,
    pub display_name: String,
}

/// Rule deciding the left-to-right order of resource columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnOrder {
    /// Order of first appearance in the availability listing.
    #[default]
    FirstSeen,
    /// Alphabetical by display name, ties broken by id.
    DisplayName,
}

impl FromStr for ColumnOrder {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "first_seen" => Ok(ColumnOrder::FirstSeen),
            "display_name" => Ok(ColumnOrder::DisplayName),
            other => Err(CoreError::Validation(format!(
                "Invalid column order '{other}'. Must be one of: first_seen, display_name"
            ))),
        }
    }
}

/// Derive the distinct resource columns for a day.
///
/// Every resource with at least one mark in `marks` becomes a column, no
/// matter which slot the mark is for. The first mark seen for a resource
/// supplies its display name.
pub fn derive_resources(marks: &[AvailabilityMark], order: ColumnOrder) -> Vec<Resource> {
    let mut seen = HashSet::new();
    let mut resources: Vec<Resource> = marks
        .iter()
        .filter(|mark| seen.insert(mark.resource_id))
        .map(|mark| Resource {
            id: mark.resource_id,
            display_name: mark.resource_name.clone(),
        })
        .collect();

    if order == ColumnOrder::DisplayName {
        resources.sort_by(|a, b| {
            a.display_name
                .to_lowercase()
                .cmp(&b.display_name.to_lowercase())
                .then(a.id.cmp(&b.id))
        });
    }

    resources
}
