use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use super::PayoutMethod;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WithdrawalStatus {
    Pending,
    Approved,
    /// Funds transfer succeeded.
    Paid,
    Rejected,
    /// Funds transfer failed after approval. Never retried automatically;
    /// resolution belongs to an admin workflow.
    Failed,
}

/// A partner's request to withdraw matured commission. The fee breakdown
/// is computed once at admission and never recalculated, even if the later
/// transfer fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    pub id: String,
    pub partner_id: String,
    pub amount_requested: f64,
    pub payout_fee: f64,
    pub monthly_fee: f64,
    pub cross_border_fee: f64,
    pub total_fees: f64,
    pub amount_to_deposit: f64,
    pub status: WithdrawalStatus,
    pub payout_method: PayoutMethod,
    pub requested_at: i64,
    pub decided_at: Option<i64>,
    pub decided_by: Option<String>,
    pub paid_at: Option<i64>,
    /// Stripe transfer id once paid.
    pub transfer_id: Option<String>,
    pub failure_reason: Option<String>,
}
