use sqlx::FromRow;
use tandem_core::availability::AvailabilityMark;
use tandem_core::error::CoreError;
use tandem_core::types::{Day, DbId, Timestamp};

/// A row from `availability` joined with `resources.display_name`.
#[derive(Debug, Clone, FromRow)]
pub struct AvailabilityRow {
    pub resource_id: DbId,
    pub day: Day,
    pub time_slot: String,
    pub created_at: Timestamp,
    pub resource_name: Option<String>,
}

impl TryFrom<AvailabilityRow> for AvailabilityMark {
    type Error = CoreError;

    fn try_from(row: AvailabilityRow) -> Result<Self, Self::Error> {
        Ok(AvailabilityMark {
            resource_id: row.resource_id,
            // Resources without a display name still get a column.
            resource_name: row.resource_name.unwrap_or_default(),
            day: row.day,
            time_slot: row.time_slot.parse()?,
        })
    }
}
