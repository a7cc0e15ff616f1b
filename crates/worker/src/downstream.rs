//! Downstream processing boundary.
//!
//! Stands in for a rate-limited third-party API that handles one identifier
//! per call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Result of processing one identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Ok { id: u64, value: String },
    Error { id: u64, reason: String },
}

impl Outcome {
    pub fn ok(id: u64, value: impl Into<String>) -> Self {
        Self::Ok {
            id,
            value: value.into(),
        }
    }

    pub fn error(id: u64, reason: impl Into<String>) -> Self {
        Self::Error {
            id,
            reason: reason.into(),
        }
    }
}

/// Processes identifiers one at a time.
#[async_trait]
pub trait Downstream: Send + Sync {
    async fn process(&self, id: u64) -> Outcome;
}

/// Simulated downstream configuration.
#[derive(Debug, Clone, Default)]
pub struct SimulatorConfig {
    /// Latency of every call
    pub latency: Duration,
    /// Identifiers that always fail
    pub failing_ids: HashSet<u64>,
}

/// Simulated downstream with fixed latency and scripted failures.
#[derive(Debug, Clone, Default)]
pub struct SimulatedDownstream {
    config: SimulatorConfig,
}

impl SimulatedDownstream {
    pub fn new(config: SimulatorConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Downstream for SimulatedDownstream {
    async fn process(&self, id: u64) -> Outcome {
        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }

        if self.config.failing_ids.contains(&id) {
            Outcome::error(id, "simulated downstream failure")
        } else {
            Outcome::ok(id, "processed")
        }
    }
}
