//! In-memory ingestion registry.
//!
//! The outer map only guards membership; each ingestion sits behind its own
//! mutex so progress on one ingestion never blocks reads of another. Every
//! read clones a snapshot under the record lock, so callers never see a
//! half-updated batch list.

use engine_core::{
    BatchId, Error, IdentifierFailure, Ingestion, IngestionId, ProcessingStatus, Result,
};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// The batch a worker should drive next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchWork {
    pub ingestion_id: IngestionId,
    pub index: usize,
    pub batch_id: BatchId,
    pub ids: Vec<u64>,
}

/// Per-status ingestion counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub yet_to_start: usize,
    pub triggered: usize,
    pub completed: usize,
}

/// Concurrency-safe registry of ingestions and their batches.
#[derive(Default)]
pub struct IngestionStore {
    records: RwLock<HashMap<IngestionId, Arc<Mutex<Ingestion>>>>,
}

impl IngestionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, id: IngestionId) -> Result<Arc<Mutex<Ingestion>>> {
        self.records
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found(id))
    }

    /// Inserts a new ingestion.
    pub fn create(&self, ingestion: Ingestion) -> Result<()> {
        let mut records = self.records.write();
        if records.contains_key(&ingestion.id) {
            return Err(Error::duplicate_id(ingestion.id));
        }

        debug!(
            ingestion_id = %ingestion.id,
            batches = ingestion.batches.len(),
            "Registered ingestion"
        );
        records.insert(ingestion.id, Arc::new(Mutex::new(ingestion)));
        Ok(())
    }

    /// Returns a consistent snapshot of an ingestion.
    pub fn get(&self, id: IngestionId) -> Result<Ingestion> {
        let record = self.record(id)?;
        let snapshot = record.lock().clone();
        Ok(snapshot)
    }

    /// Sets a batch's status and re-derives the ingestion status atomically.
    pub fn update_batch_status(
        &self,
        ingestion_id: IngestionId,
        batch_id: BatchId,
        status: ProcessingStatus,
    ) -> Result<ProcessingStatus> {
        let record = self.record(ingestion_id)?;
        let mut ingestion = record.lock();

        let batch = ingestion
            .batch_mut(batch_id)
            .ok_or_else(|| Error::batch_not_found(ingestion_id, batch_id))?;
        batch.status = status;

        Ok(ingestion.recompute_status())
    }

    /// Re-derives the ingestion status from its batches.
    pub fn recompute_ingestion_status(&self, id: IngestionId) -> Result<ProcessingStatus> {
        let record = self.record(id)?;
        let status = record.lock().recompute_status();
        Ok(status)
    }

    /// Claims the next batch for processing.
    ///
    /// Only the first incomplete batch is eligible, and only while it is
    /// `YetToStart`; claiming marks it `Triggered`. Returns `None` when every
    /// batch is complete or the first incomplete one is already in flight.
    pub fn begin_next_batch(&self, id: IngestionId) -> Result<Option<BatchWork>> {
        let record = self.record(id)?;
        let mut ingestion = record.lock();

        let Some(index) = ingestion.next_incomplete() else {
            return Ok(None);
        };

        let batch = &mut ingestion.batches[index];
        if batch.status != ProcessingStatus::YetToStart {
            return Ok(None);
        }

        batch.status = ProcessingStatus::Triggered;
        batch.failures.clear();
        let work = BatchWork {
            ingestion_id: id,
            index,
            batch_id: batch.batch_id,
            ids: batch.ids.clone(),
        };
        ingestion.recompute_status();

        Ok(Some(work))
    }

    /// Records a per-identifier downstream failure on a batch.
    pub fn record_failure(
        &self,
        ingestion_id: IngestionId,
        batch_id: BatchId,
        id: u64,
        reason: impl Into<String>,
    ) -> Result<()> {
        let record = self.record(ingestion_id)?;
        let mut ingestion = record.lock();

        let batch = ingestion
            .batch_mut(batch_id)
            .ok_or_else(|| Error::batch_not_found(ingestion_id, batch_id))?;
        batch.failures.push(IdentifierFailure {
            id,
            reason: reason.into(),
        });
        Ok(())
    }

    /// Whether any batch is still waiting to start.
    pub fn has_pending_batch(&self, id: IngestionId) -> Result<bool> {
        let record = self.record(id)?;
        let pending = record.lock().has_pending_batch();
        Ok(pending)
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Counts ingestions by derived status.
    pub fn status_counts(&self) -> StatusCounts {
        let records: Vec<_> = self.records.read().values().cloned().collect();

        let mut counts = StatusCounts::default();
        for record in records {
            match record.lock().status {
                ProcessingStatus::YetToStart => counts.yet_to_start += 1,
                ProcessingStatus::Triggered => counts.triggered += 1,
                ProcessingStatus::Completed => counts.completed += 1,
            }
        }
        counts
    }
}
