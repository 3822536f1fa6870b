//! Handlers for the daily scheduling grid.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tandem_core::grid::{DailyGrid, GridAction};
use tandem_core::time_slot::TimeSlot;
use tandem_core::types::Day;
use tandem_core::week::long_day_label;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// The grid plus what the date navigator needs.
#[derive(Debug, Serialize)]
pub struct DayGridResponse<'a> {
    pub label: String,
    pub previous_day: Option<Day>,
    pub next_day: Option<Day>,
    #[serde(flatten)]
    pub grid: DailyGrid<'a>,
}

#[derive(Debug, Deserialize)]
pub struct ActivateRequest {
    pub time_slot: TimeSlot,
    pub column: usize,
}

/// GET /api/v1/days/{date}/grid
pub async fn get_day_grid(
    State(state): State<AppState>,
    Path(date): Path<Day>,
) -> AppResult<Response> {
    let snapshot = state.schedule.day_snapshot(date).await?;
    let columns = state.schedule.columns_for(date, &snapshot);
    let grid = state.schedule.build_grid(date, &columns, &snapshot);

    let body = DayGridResponse {
        label: long_day_label(date),
        previous_day: date.pred_opt(),
        next_day: date.succ_opt(),
        grid,
    };
    // Cells borrow the snapshot, so serialize before it goes out of scope.
    Ok(Json(DataResponse { data: body }).into_response())
}

/// POST /api/v1/days/{date}/grid/activate
///
/// `data` is `null` when the clicked cell is not interactive.
pub async fn activate_cell(
    State(state): State<AppState>,
    Path(date): Path<Day>,
    Json(input): Json<ActivateRequest>,
) -> AppResult<Json<DataResponse<Option<GridAction>>>> {
    let action = state
        .schedule
        .activate(date, input.time_slot, input.column)
        .await?;
    Ok(Json(DataResponse { data: action }))
}
