//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] fans every [`ChangeEvent`] out to all subscribers. It is
//! shared via `Arc<EventBus>` across the application. Subscribers that only
//! care about one cached scope filter with [`ChangeEvent::touches`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tandem_core::cache::CacheScope;
use tandem_core::types::Day;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// ChangeEvent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeTable {
    Availability,
    Bookings,
    /// Every table; only used with [`ChangeKind::Resync`].
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
    /// Changes on unknown dates were missed; refetch everything.
    Resync,
}

/// Rows of `table` changed on `dates`.
///
/// Carries no row data: receivers refetch whatever scope covers the dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: ChangeTable,
    pub kind: ChangeKind,
    /// Affected dates, deduplicated. An update that moves a row carries both
    /// the old and the new date.
    pub dates: Vec<Day>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn new(table: ChangeTable, kind: ChangeKind, dates: impl IntoIterator<Item = Day>) -> Self {
        let mut dates: Vec<Day> = dates.into_iter().collect();
        dates.sort();
        dates.dedup();
        Self {
            table,
            kind,
            dates,
            timestamp: Utc::now(),
        }
    }

    /// Tells receivers they missed events and every scope may be stale.
    pub fn resync() -> Self {
        Self::new(ChangeTable::All, ChangeKind::Resync, Vec::<Day>::new())
    }

    pub fn is_resync(&self) -> bool {
        self.kind == ChangeKind::Resync
    }

    /// Whether a view of `scope` must refetch after this event.
    pub fn touches(&self, scope: CacheScope) -> bool {
        self.is_resync() || self.dates.iter().any(|d| scope.covers(*d))
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
pub const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug)]
pub struct EventBus {
    sender: broadcast::Sender<ChangeEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest messages are dropped and slow
    /// receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current subscribers. Dropped if there are none.
    pub fn publish(&self, event: ChangeEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn day(d: u32) -> Day {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    #[test]
    fn dates_are_sorted_and_deduplicated() {
        let event = ChangeEvent::new(
            ChangeTable::Bookings,
            ChangeKind::Update,
            [day(8), day(6), day(8)],
        );
        assert_eq!(event.dates, vec![day(6), day(8)]);
    }

    #[test]
    fn parses_notify_payload_without_timestamp() {
        let payload = r#"{"table":"availability","kind":"delete","dates":["2025-01-06"]}"#;
        let event: ChangeEvent = serde_json::from_str(payload).unwrap();
        assert_eq!(event.table, ChangeTable::Availability);
        assert_eq!(event.kind, ChangeKind::Delete);
        assert_eq!(event.dates, vec![day(6)]);
    }

    #[tokio::test]
    async fn every_subscriber_receives_each_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(ChangeEvent::new(ChangeTable::Bookings, ChangeKind::Insert, [day(6)]));

        assert_eq!(rx1.recv().await.unwrap().dates, vec![day(6)]);
        assert_eq!(rx2.recv().await.unwrap().dates, vec![day(6)]);
    }

    #[test]
    fn touches_only_covering_scopes() {
        let event = ChangeEvent::new(ChangeTable::Bookings, ChangeKind::Insert, [day(6)]);
        assert!(event.touches(CacheScope::Day(day(6))));
        assert!(!event.touches(CacheScope::Day(day(7))));
        // 2025-01-12 is the Sunday of the week starting on the 6th.
        let sunday = ChangeEvent::new(ChangeTable::Availability, ChangeKind::Delete, [day(12)]);
        assert!(sunday.touches(CacheScope::week_of(day(8))));
    }

    #[test]
    fn resync_touches_every_scope_and_round_trips() {
        let event = ChangeEvent::resync();
        assert!(event.is_resync());
        assert!(event.dates.is_empty());
        assert!(event.touches(CacheScope::Day(day(20))));

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["table"], "all");
        assert_eq!(json["kind"], "resync");
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_silent() {
        let bus = EventBus::default();
        bus.publish(ChangeEvent::new(ChangeTable::Bookings, ChangeKind::Delete, [day(6)]));

        // A later subscriber does not see earlier events.
        let mut rx = bus.subscribe();
        bus.publish(ChangeEvent::new(ChangeTable::Bookings, ChangeKind::Insert, [day(7)]));
        assert_eq!(rx.recv().await.unwrap().dates, vec![day(7)]);
    }
}
