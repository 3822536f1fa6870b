//! PostgreSQL-backed [`ScheduleStore`].

use async_trait::async_trait;
use tandem_core::availability::{AvailabilityKey, AvailabilityMark};
use tandem_core::booking::{Booking, BookingInput};
use tandem_core::resource::Resource;
use tandem_core::tag::Tag;
use tandem_core::types::{Day, DbId};

use crate::error::{StoreError, StoreResult};
use crate::models::map_rows;
use crate::repositories::{AvailabilityRepo, BookingRepo, ResourceRepo, TagRepo};
use crate::store::ScheduleStore;
use crate::DbPool;

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Single-row lookups fail loudly instead of skipping: a booking the caller
/// asked for by id that does not validate means schema drift.
fn map_booking(row: crate::models::booking::BookingRow) -> StoreResult<Booking> {
    Booking::try_from(row).map_err(|e| StoreError::Unavailable(e.to_string()))
}

#[async_trait]
impl ScheduleStore for PgStore {
    /// Row triggers `NOTIFY` every change; see the schema migration.
    fn emits_change_events(&self) -> bool {
        true
    }

    async fn list_availability(&self, from: Day, to: Day) -> StoreResult<Vec<AvailabilityMark>> {
        let rows = AvailabilityRepo::list_between(&self.pool, from, to).await?;
        Ok(map_rows("availability", rows))
    }

    async fn add_availability(&self, key: &AvailabilityKey) -> StoreResult<()> {
        AvailabilityRepo::insert(&self.pool, key).await?;
        Ok(())
    }

    async fn remove_availability(&self, key: &AvailabilityKey) -> StoreResult<()> {
        AvailabilityRepo::delete(&self.pool, key).await?;
        Ok(())
    }

    async fn find_resource(&self, id: DbId) -> StoreResult<Option<Resource>> {
        let row = ResourceRepo::find_by_id(&self.pool, id).await?;
        Ok(row.map(Resource::from))
    }

    async fn list_bookings(&self, date: Day) -> StoreResult<Vec<Booking>> {
        let rows = BookingRepo::list_for_date(&self.pool, date).await?;
        Ok(map_rows("booking", rows))
    }

    async fn find_booking(&self, id: DbId) -> StoreResult<Option<Booking>> {
        BookingRepo::find_by_id(&self.pool, id)
            .await?
            .map(map_booking)
            .transpose()
    }

    async fn create_booking(&self, input: &BookingInput) -> StoreResult<Booking> {
        let row = BookingRepo::create(&self.pool, input).await?;
        map_booking(row)
    }

    async fn update_booking(&self, id: DbId, input: &BookingInput) -> StoreResult<Option<Booking>> {
        BookingRepo::update(&self.pool, id, input)
            .await?
            .map(map_booking)
            .transpose()
    }

    async fn delete_booking(&self, id: DbId) -> StoreResult<Option<Booking>> {
        BookingRepo::delete(&self.pool, id)
            .await?
            .map(map_booking)
            .transpose()
    }

    async fn list_tags(&self) -> StoreResult<Vec<Tag>> {
        let rows = TagRepo::list(&self.pool).await?;
        Ok(map_rows("tag", rows))
    }

    async fn health_check(&self) -> StoreResult<()> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }
}
