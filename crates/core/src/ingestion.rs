//! Ingestion and batch records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::partition::partition_ids;

/// Unique ingestion identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IngestionId(Uuid);

impl IngestionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for IngestionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IngestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for IngestionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Unique batch identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(Uuid);

impl BatchId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Priority class of an ingestion.
///
/// Ordering follows dispatch order: `High < Medium < Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "HIGH" => Ok(Self::High),
            "MEDIUM" => Ok(Self::Medium),
            "LOW" => Ok(Self::Low),
            other => Err(format!("unknown priority: {}", other)),
        }
    }
}

/// Processing status shared by batches and ingestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    YetToStart,
    Triggered,
    Completed,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::YetToStart => "yet_to_start",
            Self::Triggered => "triggered",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derives an ingestion status from its batch statuses.
///
/// - every batch completed: `Completed`
/// - any batch triggered: `Triggered`
/// - otherwise: `YetToStart`, including the wait between two batches
pub fn aggregate_status(statuses: &[ProcessingStatus]) -> ProcessingStatus {
    if statuses.is_empty() {
        return ProcessingStatus::YetToStart;
    }

    let completed = statuses
        .iter()
        .filter(|s| **s == ProcessingStatus::Completed)
        .count();

    if completed == statuses.len() {
        ProcessingStatus::Completed
    } else if statuses.contains(&ProcessingStatus::Triggered) {
        ProcessingStatus::Triggered
    } else {
        ProcessingStatus::YetToStart
    }
}

/// A downstream failure for one identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierFailure {
    pub id: u64,
    pub reason: String,
}

/// A fixed-size, order-preserving slice of an ingestion's identifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub batch_id: BatchId,
    pub ids: Vec<u64>,
    pub status: ProcessingStatus,
    /// Failures from the most recent attempt.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<IdentifierFailure>,
}

impl Batch {
    pub fn new(ids: Vec<u64>) -> Self {
        Self {
            batch_id: BatchId::new(),
            ids,
            status: ProcessingStatus::YetToStart,
            failures: Vec::new(),
        }
    }
}

/// One submission and its batches.
///
/// Serializes directly as the status report returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingestion {
    #[serde(rename = "ingestion_id")]
    pub id: IngestionId,
    pub priority: Priority,
    pub status: ProcessingStatus,
    pub created_at: DateTime<Utc>,
    pub batches: Vec<Batch>,
}

impl Ingestion {
    /// Creates a new ingestion, splitting `ids` into batches of `batch_size`.
    pub fn new(ids: &[u64], priority: Priority, batch_size: usize) -> Self {
        let batches = partition_ids(ids, batch_size)
            .into_iter()
            .map(Batch::new)
            .collect();

        Self {
            id: IngestionId::new(),
            priority,
            status: ProcessingStatus::YetToStart,
            created_at: Utc::now(),
            batches,
        }
    }

    pub fn batch_statuses(&self) -> Vec<ProcessingStatus> {
        self.batches.iter().map(|b| b.status).collect()
    }

    /// Re-derives `status` from the batches and returns it.
    pub fn recompute_status(&mut self) -> ProcessingStatus {
        self.status = aggregate_status(&self.batch_statuses());
        self.status
    }

    pub fn batch_mut(&mut self, batch_id: BatchId) -> Option<&mut Batch> {
        self.batches.iter_mut().find(|b| b.batch_id == batch_id)
    }

    /// Index of the first batch that has not completed.
    pub fn next_incomplete(&self) -> Option<usize> {
        self.batches
            .iter()
            .position(|b| b.status != ProcessingStatus::Completed)
    }

    pub fn has_pending_batch(&self) -> bool {
        self.batches
            .iter()
            .any(|b| b.status == ProcessingStatus::YetToStart)
    }
}
