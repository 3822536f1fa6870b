//! WebSocket infrastructure for pushing change events to browsers.
//!
//! Provides connection management, heartbeat, the change-event forwarder
//! and the HTTP upgrade handler used by Axum routes.

mod forwarder;
mod handler;
mod heartbeat;
pub mod manager;

pub use forwarder::forward_changes;
pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
