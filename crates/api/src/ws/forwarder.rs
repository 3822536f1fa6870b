use std::sync::Arc;

use tandem_events::ChangeEvent;
use tokio::sync::broadcast;

use crate::ws::manager::WsManager;

/// Push every change event to the connected browsers whose scope it touches.
///
/// A lagged receiver has missed events of unknown dates, so clients are sent
/// a resync instead. Exits when the event bus closes.
pub async fn forward_changes(
    ws_manager: Arc<WsManager>,
    mut receiver: broadcast::Receiver<ChangeEvent>,
) {
    loop {
        match receiver.recv().await {
            Ok(event) => ws_manager.broadcast_change(&event).await,
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!(skipped = n, "WebSocket forwarder lagged, asking clients to resync");
                ws_manager.broadcast_change(&ChangeEvent::resync()).await;
            }
            Err(broadcast::error::RecvError::Closed) => {
                tracing::info!("Event bus closed, WebSocket forwarder shutting down");
                break;
            }
        }
    }
}
