//! Weekly availability editor handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use tandem_core::time_slot::TimeSlot;
use tandem_core::types::{Day, DbId};
use tandem_core::week::WeeklyAvailability;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WeekParams {
    pub resource_id: DbId,
}

#[derive(Debug, Deserialize)]
pub struct ToggleSlotRequest {
    pub resource_id: DbId,
    pub day: Day,
    pub time_slot: TimeSlot,
}

#[derive(Debug, Deserialize)]
pub struct ToggleDayRequest {
    pub resource_id: DbId,
    pub day: Day,
}

/// GET /api/v1/weeks/{date}/availability?resource_id=
pub async fn get_week(
    State(state): State<AppState>,
    Path(date): Path<Day>,
    Query(params): Query<WeekParams>,
) -> AppResult<Json<DataResponse<WeeklyAvailability>>> {
    let week = state
        .schedule
        .week_availability(params.resource_id, date)
        .await?;
    Ok(Json(DataResponse { data: week }))
}

/// POST /api/v1/availability/toggle
///
/// Returns the week after the change.
pub async fn toggle_slot(
    State(state): State<AppState>,
    Json(input): Json<ToggleSlotRequest>,
) -> AppResult<Json<DataResponse<WeeklyAvailability>>> {
    let week = state
        .schedule
        .toggle_slot(input.resource_id, input.day, input.time_slot)
        .await?;
    Ok(Json(DataResponse { data: week }))
}

/// POST /api/v1/availability/toggle-day
pub async fn toggle_day(
    State(state): State<AppState>,
    Json(input): Json<ToggleDayRequest>,
) -> AppResult<Json<DataResponse<WeeklyAvailability>>> {
    let week = state
        .schedule
        .toggle_day(input.resource_id, input.day)
        .await?;
    Ok(Json(DataResponse { data: week }))
}
