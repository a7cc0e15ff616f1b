//! Unified error types for the ingestion engine.
//!
//! Error codes:
//! - VALID_001: Request validation errors
//! - NOT_FOUND: Unknown ingestion
//! - CONFLICT_001: Duplicate ingestion id
//! - PROC_001-002: Identifier and batch processing failures
//! - INTERNAL: Inconsistent batch bookkeeping

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the ingestion engine.
#[derive(Debug, Error)]
pub enum Error {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("ingestion not found: {0}")]
    NotFound(String),

    #[error("batch {batch_id} not found in ingestion {ingestion_id}")]
    BatchNotFound {
        ingestion_id: String,
        batch_id: String,
    },

    #[error("duplicate ingestion id: {0}")]
    DuplicateId(String),

    /// A single identifier failed downstream. Recorded on the batch, never fatal.
    #[error("failed to process identifier {id}: {reason}")]
    IdentifierProcessing { id: u64, reason: String },

    /// Driving a batch failed unexpectedly. The batch is reset for retry.
    #[error("batch {batch_id} driver failure: {reason}")]
    BatchDriver { batch_id: String, reason: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(id: impl ToString) -> Self {
        Self::NotFound(id.to_string())
    }

    pub fn batch_not_found(ingestion_id: impl ToString, batch_id: impl ToString) -> Self {
        Self::BatchNotFound {
            ingestion_id: ingestion_id.to_string(),
            batch_id: batch_id.to_string(),
        }
    }

    pub fn duplicate_id(id: impl ToString) -> Self {
        Self::DuplicateId(id.to_string())
    }

    pub fn identifier_processing(id: u64, reason: impl Into<String>) -> Self {
        Self::IdentifierProcessing {
            id,
            reason: reason.into(),
        }
    }

    pub fn batch_driver(batch_id: impl ToString, reason: impl Into<String>) -> Self {
        Self::BatchDriver {
            batch_id: batch_id.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether this error means the requested ingestion does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation(_) => 422,
            Self::Serialization(_) => 422,
            Self::NotFound(_) => 404,
            Self::DuplicateId(_) => 409,
            Self::BatchNotFound { .. } => 500,
            Self::IdentifierProcessing { .. } => 502,
            Self::BatchDriver { .. } => 500,
        }
    }

    /// Get the error code string.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::Serialization(_) => "VALID_001",
            Self::NotFound(_) => "NOT_FOUND",
            Self::DuplicateId(_) => "CONFLICT_001",
            Self::IdentifierProcessing { .. } => "PROC_001",
            Self::BatchDriver { .. } => "PROC_002",
            Self::BatchNotFound { .. } => "INTERNAL",
        }
    }
}
