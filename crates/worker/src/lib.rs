//! Ingestion store, priority queue, and batch workers.
//!
//! - Store (per-ingestion batch state)
//! - Queue (priority, then submission order)
//! - Engine (one batch per dispatch, sequential within an ingestion)
//! - Scheduler (worker pool with non-blocking inter-batch delay)
//! - Service (submit and status lookups)

pub mod config;
pub mod downstream;
pub mod engine;
pub mod queue;
pub mod scheduler;
pub mod service;
pub mod store;

pub use config::EngineConfig;
pub use downstream::{Downstream, Outcome, SimulatedDownstream, SimulatorConfig};
pub use engine::{BatchProcessingEngine, DriveOutcome};
pub use queue::{PriorityWorkQueue, QueueEntry};
pub use scheduler::{WorkerConfig, WorkerScheduler};
pub use service::IngestionService;
pub use store::{BatchWork, IngestionStore, StatusCounts};
