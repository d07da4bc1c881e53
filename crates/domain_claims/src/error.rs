//! Claim intake errors

use thiserror::Error;

use core_kernel::{ClaimId, PortError};

/// Errors that abort a claim submission
///
/// Captioning and notification failures are contained by the intake service
/// and never surface here.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Missing required field: {field}")]
    Validation { field: &'static str },

    #[error("Failed to store claim {claim_id}: {source}")]
    Persistence {
        claim_id: ClaimId,
        #[source]
        source: PortError,
    },
}

impl IntakeError {
    /// Stable, machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            IntakeError::Validation { .. } => "validation_error",
            IntakeError::Persistence { .. } => "persistence_error",
        }
    }

    /// Returns true if the submitter can fix the failure by changing the request
    pub fn is_client_error(&self) -> bool {
        matches!(self, IntakeError::Validation { .. })
    }
}
