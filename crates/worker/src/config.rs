//! Engine configuration.

use engine_core::limits::{
    DEFAULT_BATCH_INTERVAL_MS, DEFAULT_BATCH_SIZE, DEFAULT_DOWNSTREAM_LATENCY_MS,
    DEFAULT_WORKER_CONCURRENCY,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::downstream::SimulatorConfig;
use crate::scheduler::WorkerConfig;

/// Batch engine configuration, as loaded from files and environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Identifiers per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Delay between batches of one ingestion in milliseconds
    #[serde(default = "default_batch_interval_ms")]
    pub batch_interval_ms: u64,
    /// Ingestions processed concurrently
    #[serde(default = "default_worker_concurrency")]
    pub worker_concurrency: usize,
    /// Simulated downstream latency per identifier in milliseconds
    #[serde(default = "default_downstream_latency_ms")]
    pub downstream_latency_ms: u64,
    /// Identifiers the simulated downstream always fails
    #[serde(default)]
    pub failing_ids: Vec<u64>,
    /// Metrics logging interval in seconds
    #[serde(default = "default_metrics_interval_secs")]
    pub metrics_interval_secs: u64,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_batch_interval_ms() -> u64 {
    DEFAULT_BATCH_INTERVAL_MS
}

fn default_worker_concurrency() -> usize {
    DEFAULT_WORKER_CONCURRENCY
}

fn default_downstream_latency_ms() -> u64 {
    DEFAULT_DOWNSTREAM_LATENCY_MS
}

fn default_metrics_interval_secs() -> u64 {
    60
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            batch_interval_ms: default_batch_interval_ms(),
            worker_concurrency: default_worker_concurrency(),
            downstream_latency_ms: default_downstream_latency_ms(),
            failing_ids: Vec::new(),
            metrics_interval_secs: default_metrics_interval_secs(),
        }
    }
}

impl EngineConfig {
    /// Batch size, never zero.
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.max(1)
    }

    pub fn worker_config(&self) -> WorkerConfig {
        WorkerConfig {
            batch_interval: Duration::from_millis(self.batch_interval_ms),
            concurrency: self.worker_concurrency.max(1),
            metrics_interval: Duration::from_secs(self.metrics_interval_secs.max(1)),
        }
    }

    pub fn simulator_config(&self) -> SimulatorConfig {
        SimulatorConfig {
            latency: Duration::from_millis(self.downstream_latency_ms),
            failing_ids: self.failing_ids.iter().copied().collect(),
        }
    }
}
