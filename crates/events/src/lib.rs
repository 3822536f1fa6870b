//! Realtime change notifications for the schedule.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`ChangeEvent`]: "rows of this table changed on these dates".
//! - [`PgChangeListener`]: bridges PostgreSQL `NOTIFY` into the bus.

pub mod bus;
pub mod listener;

pub use bus::{ChangeEvent, ChangeKind, ChangeTable, EventBus};
pub use listener::{event_for, PgChangeListener, Received, CHANNEL};
