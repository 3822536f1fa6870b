//! Bookings and the booking form's input rules.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::tag::Tag;
use crate::time_slot::TimeSlot;
use crate::types::{Day, DbId, Timestamp};

/// Largest party a single booking may hold.
pub const MAX_PEOPLE_PER_BOOKING: i32 = 100;

/// A validated booking record.
///
/// `number_of_people` is the number of contiguous resource columns the
/// booking occupies in its time row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: DbId,
    pub name: String,
    pub pickup_location: String,
    pub number_of_people: i32,
    pub resource_id: Option<DbId>,
    pub tag: Option<Tag>,
    pub booking_date: Day,
    pub time_slot: TimeSlot,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: Timestamp,
}

/// Booking fields as submitted by the create/edit forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct BookingInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Pickup location is required"))]
    pub pickup_location: String,
    #[validate(range(
        min = 1,
        max = MAX_PEOPLE_PER_BOOKING,
        message = "must be between 1 and 100"
    ))]
    pub number_of_people: i32,
    #[serde(default)]
    pub resource_id: Option<DbId>,
    #[serde(default)]
    pub tag_id: Option<DbId>,
    pub booking_date: Day,
    pub time_slot: TimeSlot,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
}

impl BookingInput {
    /// Trim text fields and treat blank optional fields as absent, then
    /// check the form rules.
    pub fn normalized(mut self) -> Result<Self, CoreError> {
        self.name = self.name.trim().to_string();
        self.pickup_location = self.pickup_location.trim().to_string();
        self.phone = blank_to_none(self.phone);
        self.email = blank_to_none(self.email);
        self.validate()?;
        Ok(self)
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Return the bookings of one slot in packing order: ascending creation
/// time, ties kept in input order.
pub fn bookings_at(bookings: &[Booking], slot: TimeSlot) -> Vec<&Booking> {
    let mut at_slot: Vec<&Booking> = bookings.iter().filter(|b| b.time_slot == slot).collect();
    at_slot.sort_by_key(|b| b.created_at);
    at_slot
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn input() -> BookingInput {
        BookingInput {
            name: "Jane Doe".to_string(),
            pickup_location: "Hotel Alpina".to_string(),
            number_of_people: 2,
            resource_id: None,
            tag_id: None,
            booking_date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            time_slot: TimeSlot::T0945,
            phone: None,
            email: None,
        }
    }

    #[test]
    fn valid_input_passes() {
        assert!(input().normalized().is_ok());
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut i = input();
        i.name = "   ".to_string();
        let err = i.normalized().unwrap_err();
        assert!(err.to_string().contains("Name is required"));
    }

    #[test]
    fn blank_pickup_is_rejected() {
        let mut i = input();
        i.pickup_location = String::new();
        assert!(i.normalized().is_err());
    }

    #[test]
    fn party_size_must_be_in_range() {
        for bad in [0, -3, MAX_PEOPLE_PER_BOOKING + 1] {
            let mut i = input();
            i.number_of_people = bad;
            assert!(i.normalized().is_err(), "{bad} should be rejected");
        }
        let mut i = input();
        i.number_of_people = MAX_PEOPLE_PER_BOOKING;
        assert!(i.normalized().is_ok());
    }

    #[test]
    fn empty_email_counts_as_absent() {
        let mut i = input();
        i.email = Some("  ".to_string());
        i.phone = Some(String::new());
        let normalized = i.normalized().unwrap();
        assert_eq!(normalized.email, None);
        assert_eq!(normalized.phone, None);
    }

    #[test]
    fn malformed_email_is_rejected() {
        let mut i = input();
        i.email = Some("not-an-email".to_string());
        let err = i.normalized().unwrap_err();
        assert!(err.to_string().contains("email"));
    }

    #[test]
    fn text_fields_are_trimmed() {
        let mut i = input();
        i.name = "  Jane  ".to_string();
        assert_eq!(i.normalized().unwrap().name, "Jane");
    }
}
