//! Core types, partitioning, and validation for the batch ingestion engine.

pub mod error;
pub mod ingestion;
pub mod limits;
pub mod partition;
pub mod request;

pub use error::{Error, Result};
pub use ingestion::*;
pub use partition::*;
pub use request::IngestRequest;
