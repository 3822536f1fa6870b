use std::sync::Arc;

use crate::config::ServerConfig;
use crate::schedule::ScheduleService;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Store, cache and event bus behind one facade.
    pub schedule: Arc<ScheduleService>,
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (browser clients).
    pub ws_manager: Arc<WsManager>,
    /// Bus carrying store change events.
    pub event_bus: Arc<tandem_events::EventBus>,
}
