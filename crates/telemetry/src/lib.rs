//! Internal telemetry for the batch ingestion engine.
//!
//! In-process counters and health state, plus structured logging setup.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;
