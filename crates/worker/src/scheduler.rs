//! Worker scheduler draining the priority queue.
//!
//! Each worker pops the highest-priority ingestion, drives one batch, and is
//! free again. An ingestion with batches left comes back to the queue after
//! the inter-batch delay, so the rate-limit wait never holds a worker and
//! every free worker goes to the highest-priority ingestion waiting.

use engine_core::limits::{DEFAULT_BATCH_INTERVAL_MS, DEFAULT_WORKER_CONCURRENCY};
use std::sync::Arc;
use std::time::Duration;
use telemetry::{health, metrics};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, error, info};

use crate::engine::{BatchProcessingEngine, DriveOutcome};
use crate::queue::{PriorityWorkQueue, QueueEntry};
use crate::store::IngestionStore;

/// Worker scheduler configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Delay between consecutive batches of one ingestion
    pub batch_interval: Duration,
    /// Number of worker tasks
    pub concurrency: usize,
    /// Metrics logging interval
    pub metrics_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            batch_interval: Duration::from_millis(DEFAULT_BATCH_INTERVAL_MS),
            concurrency: DEFAULT_WORKER_CONCURRENCY,
            metrics_interval: Duration::from_secs(60), // 1 minute
        }
    }
}

/// Pool of workers feeding ingestions to the batch engine.
pub struct WorkerScheduler {
    config: WorkerConfig,
    engine: BatchProcessingEngine,
    queue: Arc<PriorityWorkQueue>,
}

impl WorkerScheduler {
    pub fn new(
        config: WorkerConfig,
        engine: BatchProcessingEngine,
        queue: Arc<PriorityWorkQueue>,
    ) -> Self {
        Self {
            config,
            engine,
            queue,
        }
    }

    pub fn store(&self) -> &Arc<IngestionStore> {
        self.engine.store()
    }

    /// Starts the workers and the metrics task.
    pub fn start(self: Arc<Self>) -> Vec<JoinHandle<()>> {
        let concurrency = self.config.concurrency.max(1);
        let mut handles = Vec::with_capacity(concurrency + 1);

        for worker_id in 0..concurrency {
            let scheduler = self.clone();
            handles.push(tokio::spawn(async move {
                scheduler.run_worker(worker_id).await;
            }));
        }

        let scheduler = self.clone();
        handles.push(tokio::spawn(async move {
            scheduler.run_metrics_flush().await;
        }));

        health().workers.set_healthy();
        health().batches.set_healthy();
        info!(
            concurrency = concurrency,
            batch_interval_ms = self.config.batch_interval.as_millis() as u64,
            "Batch workers started"
        );
        handles
    }

    async fn run_worker(&self, worker_id: usize) {
        debug!(worker_id = worker_id, "Worker waiting for ingestions");

        loop {
            let entry = self.queue.next().await;
            metrics().queue_depth.set(self.queue.len() as u64);

            metrics().busy_workers.inc();
            self.dispatch(worker_id, entry).await;
            metrics().busy_workers.dec();
        }
    }

    /// Drives one batch of the dequeued ingestion.
    async fn dispatch(&self, worker_id: usize, entry: QueueEntry) {
        let ingestion_id = entry.ingestion_id;
        debug!(
            worker_id = worker_id,
            ingestion_id = %ingestion_id,
            priority = %entry.priority,
            seq = entry.seq,
            "Dispatching ingestion"
        );

        match self.engine.drive_next_batch(ingestion_id).await {
            Ok(outcome) if outcome.needs_requeue() => {
                if let DriveOutcome::Retry { batch_id, reason } = &outcome {
                    info!(
                        ingestion_id = %ingestion_id,
                        batch_id = %batch_id,
                        reason = %reason,
                        "Batch will be retried"
                    );
                }
                self.schedule_resume(entry);
            }
            Ok(DriveOutcome::Finished { status }) => {
                metrics().ingestions_completed.inc();
                info!(
                    ingestion_id = %ingestion_id,
                    status = %status,
                    "Ingestion finished"
                );
            }
            Ok(outcome) => {
                debug!(ingestion_id = %ingestion_id, outcome = ?outcome, "Nothing to drive");
            }
            Err(e) => {
                error!(
                    ingestion_id = %ingestion_id,
                    error = %e,
                    "Dropping queue entry"
                );
            }
        }
    }

    /// Puts the ingestion back on the queue once the rate-limit delay passes.
    fn schedule_resume(&self, entry: QueueEntry) {
        let queue = self.queue.clone();
        let delay = self.config.batch_interval;

        metrics().waiting_ingestions.inc();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let entry = queue.requeue(entry);
            metrics().waiting_ingestions.dec();
            metrics().queue_depth.set(queue.len() as u64);
            debug!(ingestion_id = %entry.ingestion_id, seq = entry.seq, "Ingestion re-queued");
        });
    }

    async fn run_metrics_flush(&self) {
        let mut ticker = interval(self.config.metrics_interval);

        loop {
            ticker.tick().await;

            metrics().queue_depth.set(self.queue.len() as u64);
            let snapshot = metrics().snapshot();
            let counts = self.store().status_counts();

            info!(
                ingestions = self.store().len(),
                yet_to_start = counts.yet_to_start,
                triggered = counts.triggered,
                completed = counts.completed,
                queue_depth = snapshot.queue_depth,
                busy_workers = snapshot.busy_workers,
                waiting = snapshot.waiting_ingestions,
                batches_completed = snapshot.batches_completed,
                batches_reset = snapshot.batches_reset,
                identifier_failures = snapshot.identifier_failures,
                batch_latency_mean_ms = snapshot.batch_latency_mean_ms,
                "Engine metrics"
            );
        }
    }
}
