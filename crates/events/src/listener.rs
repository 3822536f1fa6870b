//! Bridge from PostgreSQL `LISTEN/NOTIFY` to the [`EventBus`].
//!
//! Row triggers on `availability` and `bookings` send a JSON payload on
//! [`CHANNEL`]; each payload becomes one [`ChangeEvent`] on the bus. When the
//! connection drops, notifications sent until it is back are lost, so a
//! [`ChangeEvent::resync`] goes out instead.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgListener;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::bus::{ChangeEvent, EventBus};

/// Notification channel the schema triggers publish on.
pub const CHANNEL: &str = "schedule_changes";

/// Pause before retrying after a listener error.
const RETRY_DELAY: Duration = Duration::from_secs(2);

pub struct PgChangeListener {
    pool: PgPool,
    bus: Arc<EventBus>,
}

impl PgChangeListener {
    pub fn new(pool: PgPool, bus: Arc<EventBus>) -> Self {
        Self { pool, bus }
    }

    /// Forward notifications until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), sqlx::Error> {
        let mut listener = PgListener::connect_with(&self.pool).await?;
        listener.listen(CHANNEL).await?;
        tracing::info!(channel = CHANNEL, "Change listener started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Change listener stopping");
                    break;
                }
                received = listener.try_recv() => match received {
                    Ok(Some(notification)) => {
                        self.forward(Received::Payload(notification.payload()));
                    }
                    Ok(None) => {
                        // try_recv reconnects on the next call.
                        tracing::warn!("Change listener connection lost, reconnecting");
                        self.forward(Received::ConnectionLost);
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Change listener error, retrying");
                        self.forward(Received::ConnectionLost);
                        tokio::time::sleep(RETRY_DELAY).await;
                    }
                },
            }
        }
        Ok(())
    }

    fn forward(&self, received: Received<'_>) {
        match event_for(received) {
            Some(event) => {
                tracing::debug!(
                    table = ?event.table,
                    kind = ?event.kind,
                    dates = ?event.dates,
                    "Store change"
                );
                self.bus.publish(event);
            }
            None => tracing::warn!("Ignoring malformed change notification"),
        }
    }
}

/// What one poll of the listener produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Received<'a> {
    Payload(&'a str),
    /// The connection dropped; notifications may have been missed.
    ConnectionLost,
}

/// Event to publish for a poll result. `None` for a malformed payload.
pub fn event_for(received: Received<'_>) -> Option<ChangeEvent> {
    match received {
        Received::Payload(payload) => parse_payload(payload),
        Received::ConnectionLost => Some(ChangeEvent::resync()),
    }
}

/// Parse a trigger payload, normalising the date list.
pub fn parse_payload(payload: &str) -> Option<ChangeEvent> {
    let raw: ChangeEvent = serde_json::from_str(payload).ok()?;
    Some(ChangeEvent::new(raw.table, raw.kind, raw.dates))
}
