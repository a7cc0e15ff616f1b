//! Health check endpoints.

use axum::{extract::State, http::StatusCode, Json};
use telemetry::{health, metrics};

use crate::response::{HealthResponse, RootResponse};
use crate::state::AppState;

/// GET / - Service banner.
pub async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse::default())
}

/// GET /health - Full health check.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let report = health().report();
    let queue_depth = state.service.queue_depth() as u64;
    metrics().queue_depth.set(queue_depth);

    Json(HealthResponse {
        status: report.status.as_str().to_string(),
        workers_running: health().workers.is_healthy(),
        queue_depth,
        ingestions: state.service.ingestion_count(),
    })
}

/// GET /health/ready - Readiness check (can accept traffic).
pub async fn ready_handler() -> StatusCode {
    if health().is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health/live - Liveness check (workers are running).
pub async fn live_handler() -> StatusCode {
    if health().is_alive() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
