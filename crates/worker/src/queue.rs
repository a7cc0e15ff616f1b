//! Priority-ordered work queue feeding the workers.
//!
//! Entries are ordered by `(priority, submitted_at, seq)`. `seq` is assigned
//! at push time, so entries with identical keys pop in push order.

use chrono::{DateTime, Utc};
use engine_core::{IngestionId, Priority};
use parking_lot::Mutex;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use tokio::sync::Notify;

/// A pending ingestion job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub priority: Priority,
    pub submitted_at: DateTime<Utc>,
    pub seq: u64,
    pub ingestion_id: IngestionId,
}

impl QueueEntry {
    fn key(&self) -> (Priority, DateTime<Utc>, u64) {
        (self.priority, self.submitted_at, self.seq)
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-heap of pending ingestions with async wake-up for idle workers.
#[derive(Default)]
pub struct PriorityWorkQueue {
    heap: Mutex<BinaryHeap<Reverse<QueueEntry>>>,
    seq: AtomicU64,
    notify: Notify,
}

impl PriorityWorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new job and wakes one idle worker.
    pub fn push(
        &self,
        ingestion_id: IngestionId,
        priority: Priority,
        submitted_at: DateTime<Utc>,
    ) -> QueueEntry {
        let entry = QueueEntry {
            priority,
            submitted_at,
            seq: self.seq.fetch_add(1, AtomicOrdering::Relaxed),
            ingestion_id,
        };
        self.insert(entry.clone());
        entry
    }

    /// Re-inserts a dispatched job, keeping its priority and submission time.
    pub fn requeue(&self, entry: QueueEntry) -> QueueEntry {
        self.push(entry.ingestion_id, entry.priority, entry.submitted_at)
    }

    fn insert(&self, entry: QueueEntry) {
        self.heap.lock().push(Reverse(entry));
        self.notify.notify_one();
    }

    /// Removes the entry with the smallest key, if any.
    pub fn pop(&self) -> Option<QueueEntry> {
        let mut heap = self.heap.lock();
        let entry = heap.pop().map(|Reverse(e)| e);

        // notify_one keeps a single permit; pass the wake-up along
        if entry.is_some() && !heap.is_empty() {
            self.notify.notify_one();
        }
        entry
    }

    /// Waits for the next entry.
    pub async fn next(&self) -> QueueEntry {
        loop {
            if let Some(entry) = self.pop() {
                return entry;
            }
            self.notify.notified().await;
        }
    }

    /// Drops a pending entry before any worker picks it up.
    ///
    /// Returns `false` if the ingestion is not waiting in the queue.
    pub fn abandon(&self, ingestion_id: IngestionId) -> bool {
        let mut heap = self.heap.lock();
        let before = heap.len();
        heap.retain(|Reverse(e)| e.ingestion_id != ingestion_id);
        heap.len() != before
    }

    pub fn len(&self) -> usize {
        self.heap.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.lock().is_empty()
    }
}
