//! Tandem scheduling API server library.
//!
//! Exposes config, state, error handling, routes, the schedule service and
//! the WebSocket infrastructure so integration tests and the binary
//! entrypoint share them.

pub mod background;
pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod schedule;
pub mod state;
pub mod ws;
