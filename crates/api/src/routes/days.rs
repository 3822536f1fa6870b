use axum::routing::{get, post};
use axum::Router;

use crate::handlers::grid;
use crate::state::AppState;

/// Routes mounted at `/days`.
///
/// ```text
/// GET    /{date}/grid               -> get_day_grid
/// POST   /{date}/grid/activate      -> activate_cell
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{date}/grid", get(grid::get_day_grid))
        .route("/{date}/grid/activate", post(grid::activate_cell))
}
