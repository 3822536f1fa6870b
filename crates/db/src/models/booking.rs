use sqlx::FromRow;
use tandem_core::booking::Booking;
use tandem_core::error::CoreError;
use tandem_core::tag::{Tag, DEFAULT_TAG_COLOR};
use tandem_core::types::{Day, DbId, Timestamp};

/// A row from `bookings` left-joined with its tag.
#[derive(Debug, Clone, FromRow)]
pub struct BookingRow {
    pub id: DbId,
    pub name: String,
    pub pickup_location: String,
    pub number_of_people: i32,
    pub resource_id: Option<DbId>,
    pub tag_id: Option<DbId>,
    pub booking_date: Day,
    pub time_slot: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: Timestamp,
    pub tag_name: Option<String>,
    pub tag_color: Option<String>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = CoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let time_slot = row.time_slot.parse()?;

        // A dangling tag id (tag deleted mid-join) renders as untagged.
        let tag = match (row.tag_id, row.tag_name) {
            (Some(id), Some(name)) => Some(Tag {
                id,
                name,
                color: row
                    .tag_color
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| DEFAULT_TAG_COLOR.to_string()),
            }),
            _ => None,
        };

        Ok(Booking {
            id: row.id,
            name: row.name,
            pickup_location: row.pickup_location,
            number_of_people: row.number_of_people,
            resource_id: row.resource_id,
            tag,
            booking_date: row.booking_date,
            time_slot,
            phone: row.phone,
            email: row.email,
            created_at: row.created_at,
        })
    }
}
