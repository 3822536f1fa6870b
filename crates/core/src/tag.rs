//! Booking tags. Purely cosmetic: a tag only colours a booking cell.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Colour used for booking cells without a tag.
pub const DEFAULT_TAG_COLOR: &str = "#e5e7eb";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: DbId,
    pub name: String,
    pub color: String,
}
