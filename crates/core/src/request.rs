//! Submission request parsing and validation.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::{Error, Result};
use crate::ingestion::Priority;
use crate::limits::{MAX_IDENTIFIER, MIN_IDENTIFIER};

/// A request to ingest identifiers at a given priority.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IngestRequest {
    #[validate(length(min = 1), custom(function = "validate_identifier_range"))]
    pub ids: Vec<u64>,
    pub priority: Priority,
}

/// Validates every identifier lies in `[MIN_IDENTIFIER, MAX_IDENTIFIER]`.
#[allow(clippy::ptr_arg)]
fn validate_identifier_range(ids: &Vec<u64>) -> std::result::Result<(), ValidationError> {
    if let Some(bad) = ids
        .iter()
        .find(|id| !(MIN_IDENTIFIER..=MAX_IDENTIFIER).contains(*id))
    {
        let mut err = ValidationError::new("identifier_out_of_range");
        err.message = Some(
            format!(
                "ID {} must be between {} and {}",
                bad, MIN_IDENTIFIER, MAX_IDENTIFIER
            )
            .into(),
        );
        return Err(err);
    }
    Ok(())
}

impl IngestRequest {
    /// Parses and validates a raw JSON body.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let request: IngestRequest = serde_json::from_slice(raw)?;
        request.check()?;
        Ok(request)
    }

    /// Runs field validation, mapping failures to `Error::Validation`.
    pub fn check(&self) -> Result<()> {
        self.validate()
            .map_err(|e| Error::validation(format!("{}", e)))
    }
}
