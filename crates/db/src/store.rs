//! The persistence collaborator as seen by the rest of the system.

use async_trait::async_trait;
use tandem_core::availability::{AvailabilityKey, AvailabilityMark};
use tandem_core::booking::{Booking, BookingInput};
use tandem_core::resource::Resource;
use tandem_core::tag::Tag;
use tandem_core::types::{Day, DbId};

use crate::error::StoreResult;

/// Query and mutation interface over availability, bookings and tags.
///
/// Implementations hand back validated domain types only. Listing order is
/// part of the contract: availability in insertion order, bookings in
/// ascending `created_at`.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Marks for every day in `from..=to`, joined with the resource name.
    async fn list_availability(&self, from: Day, to: Day) -> StoreResult<Vec<AvailabilityMark>>;

    /// Insert a mark; inserting an existing mark succeeds without change.
    async fn add_availability(&self, key: &AvailabilityKey) -> StoreResult<()>;

    /// Delete a mark; deleting a missing mark succeeds without change.
    async fn remove_availability(&self, key: &AvailabilityKey) -> StoreResult<()>;

    async fn find_resource(&self, id: DbId) -> StoreResult<Option<Resource>>;

    /// Bookings of `date` in ascending creation order.
    async fn list_bookings(&self, date: Day) -> StoreResult<Vec<Booking>>;

    async fn find_booking(&self, id: DbId) -> StoreResult<Option<Booking>>;

    /// Persist a validated booking.
    async fn create_booking(&self, input: &BookingInput) -> StoreResult<Booking>;

    /// Replace a booking's fields. `None` if it does not exist.
    async fn update_booking(&self, id: DbId, input: &BookingInput) -> StoreResult<Option<Booking>>;

    /// Delete a booking, returning what was removed.
    async fn delete_booking(&self, id: DbId) -> StoreResult<Option<Booking>>;

    async fn list_tags(&self) -> StoreResult<Vec<Tag>>;

    /// Cheap reachability check.
    async fn health_check(&self) -> StoreResult<()>;

    /// Whether the store publishes its own change events for every write.
    /// When it does, callers must not publish the same changes again.
    fn emits_change_events(&self) -> bool {
        false
    }
}
