//! Application state shared across handlers.

use std::sync::Arc;
use worker::IngestionService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Submission and status facade over the store and queue
    pub service: Arc<IngestionService>,
}

impl AppState {
    pub fn new(service: Arc<IngestionService>) -> Self {
        Self { service }
    }
}
