//! Batch processing state machine.
//!
//! Each call to [`BatchProcessingEngine::drive_next_batch`] advances one
//! ingestion by exactly one batch:
//! 1. Claim the first incomplete batch (`yet_to_start` -> `triggered`)
//! 2. Call the downstream for every identifier, recording failures
//! 3. Mark the batch `completed`
//!
//! If driving the batch fails unexpectedly, the batch goes back to
//! `yet_to_start` and the caller re-queues the ingestion.

use engine_core::{BatchId, Error, IngestionId, ProcessingStatus, Result};
use std::sync::Arc;
use std::time::Instant;
use telemetry::{health, metrics};
use tracing::{debug, error, info, warn};

use crate::downstream::{Downstream, Outcome};
use crate::store::{BatchWork, IngestionStore};

/// What happened when a batch was driven.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriveOutcome {
    /// A batch completed and more are waiting.
    Pending { completed: BatchId },
    /// No batches remain.
    Finished { status: ProcessingStatus },
    /// Another driver holds the current batch.
    InFlight,
    /// The batch failed and was reset for another attempt.
    Retry { batch_id: BatchId, reason: String },
}

impl DriveOutcome {
    /// Whether the ingestion needs another scheduling pass.
    pub fn needs_requeue(&self) -> bool {
        matches!(self, Self::Pending { .. } | Self::Retry { .. })
    }
}

/// Drives ingestions one batch at a time against a downstream.
#[derive(Clone)]
pub struct BatchProcessingEngine {
    store: Arc<IngestionStore>,
    downstream: Arc<dyn Downstream>,
}

impl BatchProcessingEngine {
    pub fn new(store: Arc<IngestionStore>, downstream: Arc<dyn Downstream>) -> Self {
        Self { store, downstream }
    }

    pub fn store(&self) -> &Arc<IngestionStore> {
        &self.store
    }

    /// Processes the next batch of an ingestion.
    ///
    /// Only returns `Err` when the ingestion itself cannot be found; batch
    /// failures are contained and reported as [`DriveOutcome::Retry`].
    pub async fn drive_next_batch(&self, ingestion_id: IngestionId) -> Result<DriveOutcome> {
        let Some(work) = self.store.begin_next_batch(ingestion_id)? else {
            let status = self.store.recompute_ingestion_status(ingestion_id)?;
            debug!(ingestion_id = %ingestion_id, status = %status, "No batch to start");
            return Ok(match status {
                ProcessingStatus::Completed => DriveOutcome::Finished { status },
                _ => DriveOutcome::InFlight,
            });
        };

        metrics().batches_started.inc();
        info!(
            ingestion_id = %ingestion_id,
            batch_id = %work.batch_id,
            batch_index = work.index,
            ids = ?work.ids,
            "Processing batch"
        );

        let start = Instant::now();
        let result = match self.run_batch(work.clone()).await {
            Ok(failed) => self
                .store
                .update_batch_status(ingestion_id, work.batch_id, ProcessingStatus::Completed)
                .map(|status| (failed, status))
                .map_err(|e| Error::batch_driver(work.batch_id, e.to_string())),
            Err(e) => Err(e),
        };

        match result {
            Ok((failed, status)) => {
                let latency_ms = start.elapsed().as_millis() as u64;
                metrics().batches_completed.inc();
                metrics().batch_latency_ms.observe(latency_ms);
                health().batches.set_healthy();

                info!(
                    ingestion_id = %ingestion_id,
                    batch_id = %work.batch_id,
                    failed = failed,
                    latency_ms = latency_ms,
                    ingestion_status = %status,
                    "Completed batch"
                );

                if self.store.has_pending_batch(ingestion_id)? {
                    Ok(DriveOutcome::Pending {
                        completed: work.batch_id,
                    })
                } else {
                    Ok(DriveOutcome::Finished { status })
                }
            }
            Err(e) => Ok(self.reset_batch(&work, e)),
        }
    }

    /// Calls the downstream for every identifier of a batch.
    ///
    /// Runs on its own task so a panicking downstream surfaces as a driver
    /// failure instead of taking the worker down. Returns the number of
    /// identifiers that failed.
    async fn run_batch(&self, work: BatchWork) -> Result<usize> {
        let store = self.store.clone();
        let downstream = self.downstream.clone();
        let batch_id = work.batch_id;

        let handle = tokio::spawn(async move {
            let mut failed = 0;

            for &id in &work.ids {
                let call_start = Instant::now();
                let outcome = downstream.process(id).await;
                metrics()
                    .downstream_latency_ms
                    .observe(call_start.elapsed().as_millis() as u64);
                metrics().identifiers_processed.inc();

                if let Outcome::Error { reason, .. } = outcome {
                    failed += 1;
                    metrics().identifier_failures.inc();

                    let err = Error::identifier_processing(id, reason.clone());
                    warn!(
                        ingestion_id = %work.ingestion_id,
                        batch_id = %work.batch_id,
                        error = %err,
                        "Identifier failed, continuing batch"
                    );
                    store.record_failure(work.ingestion_id, work.batch_id, id, reason)?;
                }
            }

            Ok::<usize, Error>(failed)
        });

        match handle.await {
            Ok(result) => result.map_err(|e| Error::batch_driver(batch_id, e.to_string())),
            Err(join_err) => Err(Error::batch_driver(
                batch_id,
                format!("batch task aborted: {}", join_err),
            )),
        }
    }

    fn reset_batch(&self, work: &BatchWork, err: Error) -> DriveOutcome {
        metrics().batches_reset.inc();
        health()
            .batches
            .set_unhealthy(format!("batch {} reset: {}", work.batch_id, err));
        error!(
            ingestion_id = %work.ingestion_id,
            batch_id = %work.batch_id,
            error = %err,
            "Batch driver failed, resetting batch"
        );

        if let Err(reset_err) = self.store.update_batch_status(
            work.ingestion_id,
            work.batch_id,
            ProcessingStatus::YetToStart,
        ) {
            error!(
                ingestion_id = %work.ingestion_id,
                batch_id = %work.batch_id,
                error = %reset_err,
                "Failed to reset batch"
            );
        }

        DriveOutcome::Retry {
            batch_id: work.batch_id,
            reason: err.to_string(),
        }
    }
}
