//! Mock implementations for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use worker::{Downstream, Outcome};

/// Mock downstream that records every call in arrival order.
///
/// Implements the same `Downstream` trait as the simulator, so tests drive
/// the real engine and scheduler while observing exactly which identifiers
/// were processed and when.
#[derive(Clone, Default)]
pub struct RecordingDownstream {
    /// Identifiers seen, in call order.
    calls: Arc<Mutex<Vec<u64>>>,
    /// Identifiers that fail.
    failing: Arc<Mutex<HashSet<u64>>>,
    /// Per-call delay.
    latency: Duration,
}

impl RecordingDownstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    /// Makes the given identifiers fail from now on.
    pub fn fail_on(&self, ids: impl IntoIterator<Item = u64>) {
        self.failing.lock().extend(ids);
    }

    /// Get all recorded calls.
    pub fn calls(&self) -> Vec<u64> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl Downstream for RecordingDownstream {
    async fn process(&self, id: u64) -> Outcome {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.calls.lock().push(id);

        if self.failing.lock().contains(&id) {
            Outcome::error(id, "mock downstream failure")
        } else {
            Outcome::ok(id, "processed")
        }
    }
}
