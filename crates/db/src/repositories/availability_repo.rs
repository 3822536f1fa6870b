//! Repository for the `availability` table.

use sqlx::PgPool;
use tandem_core::availability::AvailabilityKey;
use tandem_core::types::Day;

use crate::models::availability::AvailabilityRow;

/// Column list for availability queries joined with `resources r`.
const COLUMNS: &str = "a.resource_id, a.day, a.time_slot, a.created_at, \
    r.display_name AS resource_name";

pub struct AvailabilityRepo;

impl AvailabilityRepo {
    /// All marks with `from <= day <= to`.
    ///
    /// Ordered by insertion so the first-seen column order is reproducible.
    pub async fn list_between(
        pool: &PgPool,
        from: Day,
        to: Day,
    ) -> Result<Vec<AvailabilityRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM availability a \
             LEFT JOIN resources r ON r.id = a.resource_id \
             WHERE a.day BETWEEN $1 AND $2 \
             ORDER BY a.created_at, a.resource_id, a.day, a.time_slot"
        );
        sqlx::query_as::<_, AvailabilityRow>(&query)
            .bind(from)
            .bind(to)
            .fetch_all(pool)
            .await
    }

    /// Insert a mark. Inserting an existing mark is a no-op.
    pub async fn insert(pool: &PgPool, key: &AvailabilityKey) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO availability (resource_id, day, time_slot) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (resource_id, day, time_slot) DO NOTHING",
        )
        .bind(key.resource_id)
        .bind(key.day)
        .bind(key.time_slot.as_str())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Delete a mark. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, key: &AvailabilityKey) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM availability \
             WHERE resource_id = $1 AND day = $2 AND time_slot = $3",
        )
        .bind(key.resource_id)
        .bind(key.day)
        .bind(key.time_slot.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
