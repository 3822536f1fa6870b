//! Schedule service: the store, the query cache and the event bus wired
//! together.
//!
//! Reads go through [`ScheduleCache`]: a fresh scope is served from memory,
//! a stale or missing one is refetched and installed last-write-wins.
//! Booking mutations go straight to the store and then invalidate the dates
//! they touched. Availability toggles are applied optimistically to the
//! cache first and rolled back if the store rejects them.
//!
//! Change events for local writes are published on the bus only when the
//! store does not publish its own (PostgreSQL triggers do).

use std::sync::Arc;

use tandem_core::availability::AvailabilityOp;
use tandem_core::booking::{Booking, BookingInput};
use tandem_core::cache::{CacheScope, OpTicket, ScheduleCache};
use tandem_core::error::CoreError;
use tandem_core::grid::{DailyGrid, DaySnapshot, GridAction, GridOptions};
use tandem_core::resource::Resource;
use tandem_core::tag::Tag;
use tandem_core::time_slot::TimeSlot;
use tandem_core::types::{Day, DbId};
use tandem_core::week::{plan_day_toggle, plan_slot_toggle, WeeklyAvailability};
use tandem_db::ScheduleStore;
use tandem_events::{ChangeEvent, ChangeKind, ChangeTable, EventBus};
use tokio::sync::Mutex;

use crate::error::{AppError, AppResult};

pub struct ScheduleService {
    store: Arc<dyn ScheduleStore>,
    cache: Mutex<ScheduleCache>,
    bus: Arc<EventBus>,
    grid: GridOptions,
}

impl ScheduleService {
    pub fn new(store: Arc<dyn ScheduleStore>, bus: Arc<EventBus>, grid: GridOptions) -> Self {
        Self {
            store,
            cache: Mutex::new(ScheduleCache::new()),
            bus,
            grid,
        }
    }

    pub fn store(&self) -> &Arc<dyn ScheduleStore> {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Cached reads
    // -----------------------------------------------------------------------

    /// Current view of `scope`, refetching it first if it is stale.
    pub async fn load(&self, scope: CacheScope) -> AppResult<DaySnapshot> {
        let ticket = {
            let mut cache = self.cache.lock().await;
            if cache.is_fresh(scope) {
                if let Some(view) = cache.view(scope) {
                    return Ok(view);
                }
            }
            cache.begin_fetch(scope)
        };

        // The lock is not held across the fetch; a newer fetch may land first.
        let snapshot = self.fetch(scope).await?;

        let mut cache = self.cache.lock().await;
        if !cache.install(ticket, snapshot) {
            tracing::debug!(?scope, "Discarded superseded fetch");
        }
        cache
            .view(scope)
            .ok_or_else(|| AppError::InternalError(format!("No cached view for {scope:?}")))
    }

    async fn fetch(&self, scope: CacheScope) -> AppResult<DaySnapshot> {
        let (from, to) = scope.range();
        let availability = self.store.list_availability(from, to).await?;
        let bookings = match scope {
            CacheScope::Day(date) => self.store.list_bookings(date).await?,
            CacheScope::Week(_) => Vec::new(),
        };
        tracing::debug!(
            ?scope,
            marks = availability.len(),
            bookings = bookings.len(),
            "Fetched snapshot"
        );
        Ok(DaySnapshot {
            availability,
            bookings,
        })
    }

    pub async fn day_snapshot(&self, date: Day) -> AppResult<DaySnapshot> {
        self.load(CacheScope::Day(date)).await
    }

    /// Mark every cached scope covering the event's dates stale. A resync
    /// marks everything stale.
    pub async fn invalidate(&self, event: &ChangeEvent) {
        let mut cache = self.cache.lock().await;
        if event.is_resync() {
            cache.invalidate_all();
            return;
        }
        for date in &event.dates {
            cache.invalidate(*date);
        }
    }

    pub async fn invalidate_all(&self) {
        self.cache.lock().await.invalidate_all();
    }

    // -----------------------------------------------------------------------
    // Daily grid
    // -----------------------------------------------------------------------

    pub fn columns_for(&self, date: Day, snapshot: &DaySnapshot) -> Vec<Resource> {
        DailyGrid::columns_for(date, snapshot, self.grid.column_order)
    }

    /// Pack the day and report every booking that found no room.
    pub fn build_grid<'a>(
        &self,
        date: Day,
        columns: &'a [Resource],
        snapshot: &'a DaySnapshot,
    ) -> DailyGrid<'a> {
        let grid = DailyGrid::build(date, columns, snapshot, self.grid);
        for (slot, booking) in grid.overflow() {
            tracing::warn!(
                booking_id = %booking.id,
                date = %date,
                time_slot = %slot,
                people = booking.number_of_people,
                "Booking does not fit in its time row"
            );
        }
        grid
    }

    /// Route a click on the grid.
    pub async fn activate(
        &self,
        date: Day,
        slot: TimeSlot,
        column: usize,
    ) -> AppResult<Option<GridAction>> {
        let snapshot = self.day_snapshot(date).await?;
        let columns = self.columns_for(date, &snapshot);
        let grid = DailyGrid::build(date, &columns, &snapshot, self.grid);
        Ok(grid.activate(slot, column))
    }

    // -----------------------------------------------------------------------
    // Bookings
    // -----------------------------------------------------------------------

    pub async fn get_booking(&self, id: DbId) -> AppResult<Booking> {
        self.store
            .find_booking(id)
            .await?
            .ok_or_else(|| booking_not_found(id))
    }

    pub async fn create_booking(&self, input: BookingInput) -> AppResult<Booking> {
        let input = input.normalized()?;
        let booking = self.store.create_booking(&input).await?;

        tracing::info!(
            booking_id = %booking.id,
            date = %booking.booking_date,
            time_slot = %booking.time_slot,
            people = booking.number_of_people,
            "Booking created"
        );
        self.changed(ChangeTable::Bookings, ChangeKind::Insert, [booking.booking_date])
            .await;
        Ok(booking)
    }

    /// Update a booking. A move to another date invalidates both dates.
    pub async fn update_booking(&self, id: DbId, input: BookingInput) -> AppResult<Booking> {
        let input = input.normalized()?;
        let previous = self.get_booking(id).await?;
        let booking = self
            .store
            .update_booking(id, &input)
            .await?
            .ok_or_else(|| booking_not_found(id))?;

        tracing::info!(
            booking_id = %id,
            from = %previous.booking_date,
            to = %booking.booking_date,
            "Booking updated"
        );
        self.changed(
            ChangeTable::Bookings,
            ChangeKind::Update,
            [previous.booking_date, booking.booking_date],
        )
        .await;
        Ok(booking)
    }

    pub async fn delete_booking(&self, id: DbId) -> AppResult<Booking> {
        let removed = self
            .store
            .delete_booking(id)
            .await?
            .ok_or_else(|| booking_not_found(id))?;

        tracing::info!(booking_id = %id, date = %removed.booking_date, "Booking deleted");
        self.changed(ChangeTable::Bookings, ChangeKind::Delete, [removed.booking_date])
            .await;
        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // Weekly availability
    // -----------------------------------------------------------------------

    pub async fn week_availability(
        &self,
        resource_id: DbId,
        date: Day,
    ) -> AppResult<WeeklyAvailability> {
        let resource = self.resource(resource_id).await?;
        self.week_view(&resource, date).await
    }

    /// Flip one (resource, day, slot) mark.
    pub async fn toggle_slot(
        &self,
        resource_id: DbId,
        date: Day,
        slot: TimeSlot,
    ) -> AppResult<WeeklyAvailability> {
        let resource = self.resource(resource_id).await?;
        let snapshot = self.load(CacheScope::week_of(date)).await?;
        let op = plan_slot_toggle(&snapshot.availability, &resource, date, slot);
        self.apply_ops(vec![op]).await?;
        self.week_view(&resource, date).await
    }

    /// Fill a partially marked day or clear a full one.
    pub async fn toggle_day(&self, resource_id: DbId, date: Day) -> AppResult<WeeklyAvailability> {
        let resource = self.resource(resource_id).await?;
        let snapshot = self.load(CacheScope::week_of(date)).await?;
        let ops = plan_day_toggle(&snapshot.availability, &resource, date);
        self.apply_ops(ops).await?;
        self.week_view(&resource, date).await
    }

    async fn week_view(&self, resource: &Resource, date: Day) -> AppResult<WeeklyAvailability> {
        let snapshot = self.load(CacheScope::week_of(date)).await?;
        Ok(WeeklyAvailability::build(
            resource.id,
            date,
            &snapshot.availability,
        ))
    }

    async fn resource(&self, id: DbId) -> AppResult<Resource> {
        self.store.find_resource(id).await?.ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Resource",
                id,
            })
        })
    }

    /// Show `ops` in the cache immediately, then persist them one by one.
    ///
    /// On the first store failure every op not yet persisted is rolled back
    /// and the error is returned. Ops persisted before the failure stay.
    async fn apply_ops(&self, ops: Vec<AvailabilityOp>) -> AppResult<()> {
        let Some(first) = ops.first() else {
            return Ok(());
        };
        let kind = match first {
            AvailabilityOp::Add(_) => ChangeKind::Insert,
            AvailabilityOp::Remove(_) => ChangeKind::Delete,
        };

        let tickets: Vec<OpTicket> = {
            let mut cache = self.cache.lock().await;
            ops.iter()
                .map(|op| cache.apply_optimistic(op.clone()))
                .collect()
        };

        let mut persisted = Vec::new();
        for (i, op) in ops.iter().enumerate() {
            let result = match op {
                AvailabilityOp::Add(mark) => self.store.add_availability(&mark.key()).await,
                AvailabilityOp::Remove(key) => self.store.remove_availability(key).await,
            };

            match result {
                Ok(()) => {
                    self.cache.lock().await.confirm(tickets[i]);
                    persisted.push(op.day());
                }
                Err(e) => {
                    {
                        let mut cache = self.cache.lock().await;
                        for ticket in &tickets[i..] {
                            cache.rollback(*ticket);
                        }
                    }
                    tracing::warn!(
                        error = %e,
                        rolled_back = tickets.len() - i,
                        "Availability change rejected by store"
                    );
                    if !persisted.is_empty() {
                        self.publish(ChangeEvent::new(ChangeTable::Availability, kind, persisted));
                    }
                    return Err(e.into());
                }
            }
        }

        tracing::info!(ops = ops.len(), date = %first.day(), "Availability updated");
        self.publish(ChangeEvent::new(ChangeTable::Availability, kind, persisted));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Misc
    // -----------------------------------------------------------------------

    pub async fn list_tags(&self) -> AppResult<Vec<Tag>> {
        Ok(self.store.list_tags().await?)
    }

    /// Invalidate the touched dates locally, then tell every subscriber.
    async fn changed(
        &self,
        table: ChangeTable,
        kind: ChangeKind,
        dates: impl IntoIterator<Item = Day>,
    ) {
        let event = ChangeEvent::new(table, kind, dates);
        self.invalidate(&event).await;
        self.publish(event);
    }

    /// Publish a local change unless the store already announces it.
    fn publish(&self, event: ChangeEvent) {
        if self.store.emits_change_events() {
            return;
        }
        self.bus.publish(event);
    }
}

fn booking_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Booking",
        id,
    })
}
