use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use tandem_core::cache::CacheScope;
use tandem_core::types::Timestamp;
use tandem_events::ChangeEvent;
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

pub struct WsConnection {
    pub sender: WsSender,
    /// Only events touching this scope are pushed; `None` receives all.
    pub scope: Option<CacheScope>,
    pub connected_at: Timestamp,
}

/// All open browser connections, keyed by connection id.
///
/// Wrapped in `Arc` and shared across the application.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
}

impl WsManager {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a connection and return the receiver its sink task drains.
    pub async fn add(
        &self,
        conn_id: String,
        scope: Option<CacheScope>,
    ) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            sender: tx,
            scope,
            connected_at: chrono::Utc::now(),
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    pub async fn remove(&self, conn_id: &str) {
        self.connections.write().await.remove(conn_id);
    }

    /// Send to every connection. Closed channels are skipped; their
    /// connections are removed when the receive loop ends.
    pub async fn broadcast(&self, message: Message) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(message.clone());
        }
    }

    /// Push a change event as JSON text to every connection whose scope it
    /// touches.
    pub async fn broadcast_change(&self, event: &ChangeEvent) {
        let json = match serde_json::to_string(event) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize change event");
                return;
            }
        };
        let message = Message::Text(json.into());
        let conns = self.connections.read().await;
        for conn in conns.values() {
            if conn.scope.map_or(true, |scope| event.touches(scope)) {
                let _ = conn.sender.send(message.clone());
            }
        }
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Send a Close frame to every connection, then clear the map.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}
