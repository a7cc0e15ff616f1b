//! Submit and status operations exposed to the transport layer.

use engine_core::{Error, Ingestion, IngestionId, Priority, Result};
use std::sync::Arc;
use telemetry::metrics;
use tracing::{debug, info};

use crate::queue::PriorityWorkQueue;
use crate::store::IngestionStore;

/// Entry point for submissions and status lookups.
///
/// Submissions return as soon as the ingestion is registered and queued;
/// status lookups read the store and never wait on workers.
pub struct IngestionService {
    store: Arc<IngestionStore>,
    queue: Arc<PriorityWorkQueue>,
    batch_size: usize,
}

impl IngestionService {
    pub fn new(store: Arc<IngestionStore>, queue: Arc<PriorityWorkQueue>, batch_size: usize) -> Self {
        Self {
            store,
            queue,
            batch_size: batch_size.max(1),
        }
    }

    /// Registers an ingestion and queues it for processing.
    ///
    /// Identifiers are expected to have passed request validation.
    pub fn submit(&self, ids: &[u64], priority: Priority) -> Result<IngestionId> {
        if ids.is_empty() {
            return Err(Error::validation("ids must not be empty"));
        }

        let ingestion = Ingestion::new(ids, priority, self.batch_size);
        let id = ingestion.id;
        let created_at = ingestion.created_at;
        let batches = ingestion.batches.len();

        self.store.create(ingestion)?;
        let entry = self.queue.push(id, priority, created_at);

        metrics().ingestions_submitted.inc();
        metrics().identifiers_received.inc_by(ids.len() as u64);
        metrics().queue_depth.set(self.queue.len() as u64);

        info!(
            ingestion_id = %id,
            priority = %priority,
            ids = ids.len(),
            batches = batches,
            seq = entry.seq,
            "Ingestion submitted"
        );
        Ok(id)
    }

    /// Returns the current status of an ingestion and its batches.
    pub fn get_status(&self, id: IngestionId) -> Result<Ingestion> {
        self.store.get(id)
    }

    /// Looks up an ingestion by its string id; malformed ids are not found.
    pub fn get_status_str(&self, raw: &str) -> Result<Ingestion> {
        let id: IngestionId = raw.parse().map_err(|_| Error::not_found(raw))?;
        self.get_status(id)
    }

    /// Abandons an ingestion that no worker has picked up yet.
    ///
    /// The stored record is left untouched. Returns `false` once a worker
    /// has dispatched the ingestion.
    pub fn cancel(&self, id: IngestionId) -> bool {
        let abandoned = self.queue.abandon(id);
        if abandoned {
            metrics().ingestions_abandoned.inc();
            metrics().queue_depth.set(self.queue.len() as u64);
            info!(ingestion_id = %id, "Pending ingestion abandoned");
        } else {
            debug!(ingestion_id = %id, "Ingestion not pending, nothing to abandon");
        }
        abandoned
    }

    pub fn queue_depth(&self) -> usize {
        self.queue.len()
    }

    pub fn ingestion_count(&self) -> usize {
        self.store.len()
    }
}
