use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ClaimStatus {
    Pending,
    /// Finalized by the scheduled sweep rather than a human.
    AutoApproved,
    Approved,
    Rejected,
}

/// A customer request to raise a license's device allowance by one.
///
/// The first two claims ever made for a license are scheduled for automatic
/// approval (`scheduled_approval_at` set, `requires_review` false); every
/// later claim waits for an explicit admin decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionClaim {
    pub id: String,
    /// Sequential human-readable number, unique across all claims.
    pub claim_number: String,
    pub license_id: String,
    pub email: String,
    pub reason: String,
    pub receipt_info: Option<String>,
    pub status: ClaimStatus,
    pub requires_review: bool,
    /// Due time for the auto-approval sweep. None for reviewed claims.
    pub scheduled_approval_at: Option<i64>,
    pub requested_at: i64,
    pub decided_at: Option<i64>,
    pub decided_by: Option<String>,
}
