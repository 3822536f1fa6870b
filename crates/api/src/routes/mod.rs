pub mod availability;
pub mod bookings;
pub mod days;
pub mod health;
pub mod tags;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /ws                                  WebSocket (change events, ?day= or ?week=)
///
/// /days/{date}/grid                    daily grid
/// /days/{date}/grid/activate           route a cell click (POST)
///
/// /bookings                            create (POST)
/// /bookings/{id}                       get, update (PUT), delete
///
/// /weeks/{date}/availability           weekly view (?resource_id=)
/// /availability/toggle                 toggle one slot (POST)
/// /availability/toggle-day             toggle a whole day (POST)
///
/// /tags                                list
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/days", days::router())
        .nest("/bookings", bookings::router())
        .nest("/weeks", availability::weeks_router())
        .nest("/availability", availability::router())
        .nest("/tags", tags::router())
}
