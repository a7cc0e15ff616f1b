//! Common test setup functions.

use api::{router, state::AppState};
use axum::Router;
use engine_core::{Ingestion, IngestionId, ProcessingStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use worker::{
    BatchProcessingEngine, IngestionService, IngestionStore, PriorityWorkQueue, WorkerConfig,
    WorkerScheduler,
};

use crate::mocks::RecordingDownstream;

/// Delay between batches used by tests, short enough to keep runs fast.
pub const TEST_BATCH_INTERVAL: Duration = Duration::from_millis(50);

/// Test context wired like the binary, with a recording downstream.
///
/// - Real Axum router with all layers
/// - Real store, queue, engine, and scheduler
/// - `RecordingDownstream` in place of the simulator
///
/// Workers are not running until [`start_workers`](Self::start_workers), so
/// tests can submit several ingestions before any dispatch happens.
pub struct TestContext {
    pub downstream: RecordingDownstream,
    pub service: Arc<IngestionService>,
    pub scheduler: Arc<WorkerScheduler>,
    pub router: Router,
    handles: Vec<JoinHandle<()>>,
}

impl TestContext {
    /// Create a context with one worker and the default batch size.
    pub fn new() -> Self {
        Self::with_config(WorkerConfig {
            batch_interval: TEST_BATCH_INTERVAL,
            concurrency: 1,
            metrics_interval: Duration::from_secs(60),
        })
    }

    pub fn with_config(config: WorkerConfig) -> Self {
        Self::with_downstream(config, RecordingDownstream::new())
    }

    pub fn with_downstream(config: WorkerConfig, downstream: RecordingDownstream) -> Self {
        let store = Arc::new(IngestionStore::new());
        let queue = Arc::new(PriorityWorkQueue::new());

        let engine = BatchProcessingEngine::new(store.clone(), Arc::new(downstream.clone()));
        let scheduler = Arc::new(WorkerScheduler::new(config, engine, queue.clone()));
        let service = Arc::new(IngestionService::new(store, queue, 3));
        let router = router(AppState::new(service.clone()));

        Self {
            downstream,
            service,
            scheduler,
            router,
            handles: Vec::new(),
        }
    }

    /// Start the worker pool.
    pub fn start_workers(&mut self) {
        self.handles = self.scheduler.clone().start();
    }

    /// Poll until the ingestion completes or the timeout elapses.
    pub async fn wait_for_completion(&self, id: IngestionId, timeout: Duration) -> Ingestion {
        tokio::time::timeout(timeout, async {
            loop {
                let ingestion = self.service.get_status(id).expect("ingestion exists");
                if ingestion.status == ProcessingStatus::Completed {
                    return ingestion;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("ingestion did not complete in time")
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}
