//! Booking CRUD handlers.
//!
//! Inputs are validated before anything reaches the store. Every successful
//! write invalidates the cached grid for the dates it touched.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tandem_core::booking::{Booking, BookingInput};
use tandem_core::types::DbId;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/bookings/{id}
pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Booking>>> {
    let booking = state.schedule.get_booking(id).await?;
    Ok(Json(DataResponse { data: booking }))
}

/// POST /api/v1/bookings
pub async fn create_booking(
    State(state): State<AppState>,
    Json(input): Json<BookingInput>,
) -> AppResult<(StatusCode, Json<DataResponse<Booking>>)> {
    let booking = state.schedule.create_booking(input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: booking })))
}

/// PUT /api/v1/bookings/{id}
pub async fn update_booking(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<BookingInput>,
) -> AppResult<Json<DataResponse<Booking>>> {
    let booking = state.schedule.update_booking(id, input).await?;
    Ok(Json(DataResponse { data: booking }))
}

/// DELETE /api/v1/bookings/{id}
pub async fn delete_booking(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.schedule.delete_booking(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
