//! Keeps the query cache in step with store change events.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tandem_events::ChangeEvent;

use crate::schedule::ScheduleService;

/// Mark cached scopes stale for every change event until `cancel` fires or
/// the bus closes.
///
/// A lagged receiver has missed events of unknown dates, so the whole cache
/// is invalidated.
pub async fn run(
    schedule: Arc<ScheduleService>,
    mut receiver: broadcast::Receiver<ChangeEvent>,
    cancel: CancellationToken,
) {
    tracing::info!("Cache invalidator started");
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Cache invalidator stopping");
                break;
            }
            received = receiver.recv() => match received {
                Ok(event) => {
                    tracing::debug!(table = ?event.table, dates = ?event.dates, "Invalidating cached scopes");
                    schedule.invalidate(&event).await;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Cache invalidator lagged, invalidating everything");
                    schedule.invalidate_all().await;
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, cache invalidator shutting down");
                    break;
                }
            },
        }
    }
}
