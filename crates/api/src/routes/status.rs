//! Status lookup endpoint.

use axum::{
    extract::{Path, State},
    Json,
};
use engine_core::Ingestion;

use crate::response::ApiError;
use crate::state::AppState;

/// GET /status/:ingestion_id - Current status of an ingestion and its batches.
pub async fn status_handler(
    State(state): State<AppState>,
    Path(ingestion_id): Path<String>,
) -> Result<Json<Ingestion>, ApiError> {
    let ingestion = state.service.get_status_str(&ingestion_id)?;
    Ok(Json(ingestion))
}
