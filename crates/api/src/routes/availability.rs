use axum::routing::{get, post};
use axum::Router;

use crate::handlers::availability;
use crate::state::AppState;

/// Routes mounted at `/weeks`.
///
/// ```text
/// GET    /{date}/availability?resource_id=   -> get_week
/// ```
pub fn weeks_router() -> Router<AppState> {
    Router::new().route("/{date}/availability", get(availability::get_week))
}

/// Routes mounted at `/availability`.
///
/// ```text
/// POST   /toggle        -> toggle_slot
/// POST   /toggle-day    -> toggle_day
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/toggle", post(availability::toggle_slot))
        .route("/toggle-day", post(availability::toggle_day))
}
