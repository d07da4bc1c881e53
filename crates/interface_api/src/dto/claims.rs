//! Claims DTOs

use core_kernel::ClaimId;
use serde::{Deserialize, Serialize};

/// Message returned with every accepted submission
pub const SUCCESS_MESSAGE: &str = "Claim submitted successfully.";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitClaimResponse {
    pub status: String,
    pub claim_id: ClaimId,
    pub message: String,
}

impl SubmitClaimResponse {
    pub fn success(claim_id: ClaimId) -> Self {
        Self {
            status: "success".to_string(),
            claim_id,
            message: SUCCESS_MESSAGE.to_string(),
        }
    }
}
