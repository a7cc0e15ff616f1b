//! Submission endpoint.

use axum::{body::Bytes, extract::State, Json};
use engine_core::IngestRequest;
use tracing::{debug, warn};

use crate::response::{ApiError, IngestResponse};
use crate::state::AppState;

/// POST /ingest - Queue identifiers for batch processing.
///
/// Returns as soon as the ingestion is registered; processing happens on the
/// worker pool.
pub async fn ingest_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<IngestResponse>, ApiError> {
    debug!(payload_size = body.len(), "Received ingest request");

    let request = IngestRequest::parse(&body).map_err(|e| {
        warn!(error = %e, "Rejected ingest request");
        ApiError::from(e)
    })?;

    let ingestion_id = state.service.submit(&request.ids, request.priority)?;
    Ok(Json(IngestResponse { ingestion_id }))
}
