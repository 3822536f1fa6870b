use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tandem_core::cache::CacheScope;
use tandem_core::types::Day;

use crate::state::AppState;
use crate::ws::manager::WsManager;

/// Optional subscription scope. `day` wins over `week` when both are given.
#[derive(Debug, Default, Deserialize)]
pub struct WsParams {
    pub day: Option<Day>,
    /// Any date of the week to follow.
    pub week: Option<Day>,
}

impl WsParams {
    pub fn scope(&self) -> Option<CacheScope> {
        self.day
            .map(CacheScope::Day)
            .or_else(|| self.week.map(CacheScope::week_of))
    }
}

/// GET /api/v1/ws?day=|week=
///
/// Upgrade to a WebSocket that receives store change events, all of them or
/// only those touching the requested day or week.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
) -> impl IntoResponse {
    let scope = params.scope();
    ws.on_upgrade(move |socket| handle_socket(socket, state.ws_manager, scope))
}

/// Register the connection, forward queued messages to the sink on a
/// spawned task, and drain inbound frames until the client goes away.
async fn handle_socket(socket: WebSocket, ws_manager: Arc<WsManager>, scope: Option<CacheScope>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, ?scope, "WebSocket connected");

    let mut rx = ws_manager.add(conn_id.clone(), scope).await;
    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    // Clients only listen; inbound frames other than Close are ignored.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}
