//! Repository for the `bookings` table.
//!
//! Every query returns the booking joined with its tag so callers never
//! need a second round-trip for the cell colour.

use sqlx::PgPool;
use tandem_core::booking::BookingInput;
use tandem_core::types::{Day, DbId};

use crate::models::booking::BookingRow;

/// Column list for booking queries over a relation aliased `b`, joined with `tags t`.
const COLUMNS: &str = "b.id, b.name, b.pickup_location, b.number_of_people, \
    b.resource_id, b.tag_id, b.booking_date, b.time_slot, b.phone, b.email, \
    b.created_at, t.name AS tag_name, t.color AS tag_color";

pub struct BookingRepo;

impl BookingRepo {
    /// Bookings of one date in creation order.
    pub async fn list_for_date(pool: &PgPool, date: Day) -> Result<Vec<BookingRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM bookings b \
             LEFT JOIN tags t ON t.id = b.tag_id \
             WHERE b.booking_date = $1 \
             ORDER BY b.created_at, b.id"
        );
        sqlx::query_as::<_, BookingRow>(&query)
            .bind(date)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<BookingRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM bookings b \
             LEFT JOIN tags t ON t.id = b.tag_id \
             WHERE b.id = $1"
        );
        sqlx::query_as::<_, BookingRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &PgPool, input: &BookingInput) -> Result<BookingRow, sqlx::Error> {
        let query = format!(
            "WITH b AS ( \
                 INSERT INTO bookings \
                     (name, pickup_location, number_of_people, resource_id, tag_id, \
                      booking_date, time_slot, phone, email) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
                 RETURNING * \
             ) \
             SELECT {COLUMNS} FROM b LEFT JOIN tags t ON t.id = b.tag_id"
        );
        sqlx::query_as::<_, BookingRow>(&query)
            .bind(&input.name)
            .bind(&input.pickup_location)
            .bind(input.number_of_people)
            .bind(input.resource_id)
            .bind(input.tag_id)
            .bind(input.booking_date)
            .bind(input.time_slot.as_str())
            .bind(input.phone.as_deref())
            .bind(input.email.as_deref())
            .fetch_one(pool)
            .await
    }

    /// Replace every editable field. Returns `None` if the booking does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &BookingInput,
    ) -> Result<Option<BookingRow>, sqlx::Error> {
        let query = format!(
            "WITH b AS ( \
                 UPDATE bookings SET \
                     name = $2, pickup_location = $3, number_of_people = $4, \
                     resource_id = $5, tag_id = $6, booking_date = $7, time_slot = $8, \
                     phone = $9, email = $10, updated_at = now() \
                 WHERE id = $1 \
                 RETURNING * \
             ) \
             SELECT {COLUMNS} FROM b LEFT JOIN tags t ON t.id = b.tag_id"
        );
        sqlx::query_as::<_, BookingRow>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.pickup_location)
            .bind(input.number_of_people)
            .bind(input.resource_id)
            .bind(input.tag_id)
            .bind(input.booking_date)
            .bind(input.time_slot.as_str())
            .bind(input.phone.as_deref())
            .bind(input.email.as_deref())
            .fetch_optional(pool)
            .await
    }

    /// Delete a booking, returning the removed row.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<BookingRow>, sqlx::Error> {
        let query = format!(
            "WITH b AS (DELETE FROM bookings WHERE id = $1 RETURNING *) \
             SELECT {COLUMNS} FROM b LEFT JOIN tags t ON t.id = b.tag_id"
        );
        sqlx::query_as::<_, BookingRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
