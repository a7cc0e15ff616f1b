//! Internal metrics collection.
//!
//! Collects metrics in-memory; the scheduler logs a snapshot periodically.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// A gauge metric (can go up or down).
#[derive(Debug, Default)]
pub struct Gauge(AtomicU64);

impl Gauge {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn set(&self, val: u64) {
        self.0.store(val, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Decrements, saturating at zero.
    pub fn dec(&self) {
        let _ = self
            .0
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| v.checked_sub(1));
    }
}

/// Histogram for latency tracking.
#[derive(Debug)]
pub struct Histogram {
    /// Buckets: 10ms, 50ms, 100ms, 500ms, 1s, 2.5s, 5s, 10s, 30s, 60s, +Inf
    buckets: [AtomicU64; 11],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 11] = [10, 50, 100, 500, 1000, 2500, 5000, 10000, 30000, 60000, u64::MAX];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Records a value in milliseconds.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        let idx = Self::BUCKET_BOUNDS
            .iter()
            .position(|&bound| ms <= bound)
            .unwrap_or(Self::BUCKET_BOUNDS.len() - 1);
        self.buckets[idx].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum() as f64 / count as f64
        }
    }

    /// Returns bucket counts.
    pub fn buckets(&self) -> Vec<(u64, u64)> {
        Self::BUCKET_BOUNDS
            .iter()
            .zip(self.buckets.iter())
            .map(|(&bound, count)| (bound, count.load(Ordering::Relaxed)))
            .collect()
    }
}

/// Collected metrics for the ingestion engine.
#[derive(Debug, Default)]
pub struct Metrics {
    // Submission metrics
    pub ingestions_submitted: Counter,
    pub ingestions_completed: Counter,
    pub ingestions_abandoned: Counter,
    pub identifiers_received: Counter,

    // Batch engine metrics
    pub batches_started: Counter,
    pub batches_completed: Counter,
    pub batches_reset: Counter,
    pub identifiers_processed: Counter,
    pub identifier_failures: Counter,

    // Latency histograms
    pub batch_latency_ms: Histogram,
    pub downstream_latency_ms: Histogram,

    // Gauges
    pub queue_depth: Gauge,
    pub busy_workers: Gauge,
    pub waiting_ingestions: Gauge,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub ingestions_submitted: u64,
    pub ingestions_completed: u64,
    pub ingestions_abandoned: u64,
    pub identifiers_received: u64,
    pub batches_started: u64,
    pub batches_completed: u64,
    pub batches_reset: u64,
    pub identifiers_processed: u64,
    pub identifier_failures: u64,
    pub batch_latency_mean_ms: f64,
    pub downstream_latency_mean_ms: f64,
    pub queue_depth: u64,
    pub busy_workers: u64,
    pub waiting_ingestions: u64,
}

impl Metrics {
    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            ingestions_submitted: self.ingestions_submitted.get(),
            ingestions_completed: self.ingestions_completed.get(),
            ingestions_abandoned: self.ingestions_abandoned.get(),
            identifiers_received: self.identifiers_received.get(),
            batches_started: self.batches_started.get(),
            batches_completed: self.batches_completed.get(),
            batches_reset: self.batches_reset.get(),
            identifiers_processed: self.identifiers_processed.get(),
            identifier_failures: self.identifier_failures.get(),
            batch_latency_mean_ms: self.batch_latency_ms.mean(),
            downstream_latency_mean_ms: self.downstream_latency_ms.mean(),
            queue_depth: self.queue_depth.get(),
            busy_workers: self.busy_workers.get(),
            waiting_ingestions: self.waiting_ingestions.get(),
        }
    }
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
