use axum::extract::State;
use axum::Json;
use tandem_core::tag::Tag;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/tags
pub async fn list_tags(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Tag>>>> {
    let tags = state.schedule.list_tags().await?;
    Ok(Json(DataResponse { data: tags }))
}
