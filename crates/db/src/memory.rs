//! In-process [`ScheduleStore`] for development and tests.
//!
//! Keeps the same ordering contract as the PostgreSQL store and can be told
//! to fail writes or reads so callers' error paths can be exercised. With a
//! change feed attached it also publishes a [`ChangeEvent`] per changed row,
//! the way the PostgreSQL triggers do.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tandem_core::availability::{AvailabilityKey, AvailabilityMark};
use tandem_core::booking::{Booking, BookingInput};
use tandem_core::resource::Resource;
use tandem_core::tag::Tag;
use tandem_core::types::{Day, DbId, Timestamp};
use tandem_events::{ChangeEvent, ChangeKind, ChangeTable, EventBus};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::store::ScheduleStore;

#[derive(Debug, Default)]
struct State {
    resources: Vec<Resource>,
    /// Insertion order is the listing order.
    availability: Vec<AvailabilityKey>,
    bookings: Vec<Booking>,
    tags: Vec<Tag>,
    last_created_at: Option<Timestamp>,
}

impl State {
    fn resource(&self, id: DbId) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == id)
    }

    fn tag(&self, id: DbId) -> Option<&Tag> {
        self.tags.iter().find(|t| t.id == id)
    }

    /// Strictly increasing creation stamps so creation order is total.
    fn next_created_at(&mut self) -> Timestamp {
        let now = Utc::now();
        let stamp = match self.last_created_at {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_created_at = Some(stamp);
        stamp
    }

    fn build_booking(
        &self,
        id: DbId,
        input: &BookingInput,
        created_at: Timestamp,
    ) -> StoreResult<Booking> {
        let tag = match input.tag_id {
            Some(tag_id) => Some(self.tag(tag_id).cloned().ok_or(StoreError::NotFound {
                entity: "tag",
                id: tag_id,
            })?),
            None => None,
        };
        if let Some(resource_id) = input.resource_id {
            if self.resource(resource_id).is_none() {
                return Err(StoreError::NotFound {
                    entity: "resource",
                    id: resource_id,
                });
            }
        }
        Ok(Booking {
            id,
            name: input.name.clone(),
            pickup_location: input.pickup_location.clone(),
            number_of_people: input.number_of_people,
            resource_id: input.resource_id,
            tag,
            booking_date: input.booking_date,
            time_slot: input.time_slot,
            phone: input.phone.clone(),
            email: input.email.clone(),
            created_at,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
    failing_writes: Arc<AtomicUsize>,
    unreachable: Arc<AtomicBool>,
    change_feed: Option<Arc<EventBus>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Seeding
    // -----------------------------------------------------------------------

    pub async fn add_resource(&self, display_name: &str) -> Resource {
        let resource = Resource {
            id: Uuid::new_v4(),
            display_name: display_name.to_string(),
        };
        self.state.write().await.resources.push(resource.clone());
        resource
    }

    pub async fn add_tag(&self, name: &str, color: &str) -> Tag {
        let tag = Tag {
            id: Uuid::new_v4(),
            name: name.to_string(),
            color: color.to_string(),
        };
        self.state.write().await.tags.push(tag.clone());
        tag
    }

    /// A store with four resources and two tags, for running the server
    /// without a database.
    pub async fn with_demo_data() -> Self {
        let store = Self::new();
        for name in ["Alex", "Brooke", "Chris", "Dana"] {
            store.add_resource(name).await;
        }
        store.add_tag("Hotel pickup", "#bfdbfe").await;
        store.add_tag("Private", "#fde68a").await;
        store
    }

    /// Publish a change event on `bus` for every row a write changes.
    pub fn with_change_feed(mut self, bus: Arc<EventBus>) -> Self {
        self.change_feed = Some(bus);
        self
    }

    fn notify(&self, table: ChangeTable, kind: ChangeKind, dates: impl IntoIterator<Item = Day>) {
        if let Some(bus) = &self.change_feed {
            bus.publish(ChangeEvent::new(table, kind, dates));
        }
    }

    // -----------------------------------------------------------------------
    // Failure injection
    // -----------------------------------------------------------------------

    /// Make the next `count` writes fail with [`StoreError::Unavailable`].
    pub fn fail_next_writes(&self, count: usize) {
        self.failing_writes.store(count, Ordering::SeqCst);
    }

    /// Make every operation fail until reset.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    fn check_reachable(&self) -> StoreResult<()> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is unreachable".into()));
        }
        Ok(())
    }

    fn check_write(&self) -> StoreResult<()> {
        self.check_reachable()?;
        let injected = self
            .failing_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if injected.is_ok() {
            return Err(StoreError::Unavailable("injected write failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    async fn list_availability(&self, from: Day, to: Day) -> StoreResult<Vec<AvailabilityMark>> {
        self.check_reachable()?;
        let state = self.state.read().await;
        Ok(state
            .availability
            .iter()
            .filter(|k| from <= k.day && k.day <= to)
            .map(|k| AvailabilityMark {
                resource_id: k.resource_id,
                resource_name: state
                    .resource(k.resource_id)
                    .map(|r| r.display_name.clone())
                    .unwrap_or_default(),
                day: k.day,
                time_slot: k.time_slot,
            })
            .collect())
    }

    async fn add_availability(&self, key: &AvailabilityKey) -> StoreResult<()> {
        self.check_write()?;
        let mut state = self.state.write().await;
        if state.resource(key.resource_id).is_none() {
            return Err(StoreError::NotFound {
                entity: "resource",
                id: key.resource_id,
            });
        }
        if !state.availability.contains(key) {
            state.availability.push(*key);
            self.notify(ChangeTable::Availability, ChangeKind::Insert, [key.day]);
        }
        Ok(())
    }

    async fn remove_availability(&self, key: &AvailabilityKey) -> StoreResult<()> {
        self.check_write()?;
        let mut state = self.state.write().await;
        let before = state.availability.len();
        state.availability.retain(|k| k != key);
        if state.availability.len() != before {
            self.notify(ChangeTable::Availability, ChangeKind::Delete, [key.day]);
        }
        Ok(())
    }

    async fn find_resource(&self, id: DbId) -> StoreResult<Option<Resource>> {
        self.check_reachable()?;
        Ok(self.state.read().await.resource(id).cloned())
    }

    async fn list_bookings(&self, date: Day) -> StoreResult<Vec<Booking>> {
        self.check_reachable()?;
        let state = self.state.read().await;
        let mut bookings: Vec<Booking> = state
            .bookings
            .iter()
            .filter(|b| b.booking_date == date)
            .cloned()
            .collect();
        bookings.sort_by_key(|b| b.created_at);
        Ok(bookings)
    }

    async fn find_booking(&self, id: DbId) -> StoreResult<Option<Booking>> {
        self.check_reachable()?;
        Ok(self
            .state
            .read()
            .await
            .bookings
            .iter()
            .find(|b| b.id == id)
            .cloned())
    }

    async fn create_booking(&self, input: &BookingInput) -> StoreResult<Booking> {
        self.check_write()?;
        let mut state = self.state.write().await;
        let created_at = state.next_created_at();
        let booking = state.build_booking(Uuid::new_v4(), input, created_at)?;
        state.bookings.push(booking.clone());
        self.notify(ChangeTable::Bookings, ChangeKind::Insert, [booking.booking_date]);
        Ok(booking)
    }

    async fn update_booking(&self, id: DbId, input: &BookingInput) -> StoreResult<Option<Booking>> {
        self.check_write()?;
        let mut state = self.state.write().await;
        let Some(pos) = state.bookings.iter().position(|b| b.id == id) else {
            return Ok(None);
        };
        let updated = state.build_booking(id, input, state.bookings[pos].created_at)?;
        let previous = std::mem::replace(&mut state.bookings[pos], updated.clone());
        self.notify(
            ChangeTable::Bookings,
            ChangeKind::Update,
            [previous.booking_date, updated.booking_date],
        );
        Ok(Some(updated))
    }

    async fn delete_booking(&self, id: DbId) -> StoreResult<Option<Booking>> {
        self.check_write()?;
        let mut state = self.state.write().await;
        let Some(pos) = state.bookings.iter().position(|b| b.id == id) else {
            return Ok(None);
        };
        let removed = state.bookings.remove(pos);
        self.notify(ChangeTable::Bookings, ChangeKind::Delete, [removed.booking_date]);
        Ok(Some(removed))
    }

    async fn list_tags(&self) -> StoreResult<Vec<Tag>> {
        self.check_reachable()?;
        let mut tags = self.state.read().await.tags.clone();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.check_reachable()
    }

    fn emits_change_events(&self) -> bool {
        self.change_feed.is_some()
    }
}
