use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// Days after order creation before its commission becomes withdrawable.
/// Covers the storefront refund window.
pub const MATURITY_DAYS: i64 = 16;

pub const SECONDS_PER_DAY: i64 = 86400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderStatus {
    Completed,
    Refunded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RefundStatus {
    None,
    Requested,
    VerifiedPending,
    Approved,
    Rejected,
    Disputed,
}

/// Admin/customer actions against an order's refund state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RefundAction {
    Request,
    Verify,
    Approve,
    Reject,
    Dispute,
}

impl RefundStatus {
    /// Apply an action, returning the next state or None when the
    /// transition is not allowed. A disputed order permanently blocks the
    /// normal approval path; it must be resolved out-of-band.
    pub fn apply(self, action: RefundAction) -> Option<RefundStatus> {
        use RefundAction::*;
        use RefundStatus::*;
        match (self, action) {
            (None, Request) => Some(Requested),
            (Requested, Verify) => Some(VerifiedPending),
            (Requested | VerifiedPending, Approve) => Some(Approved),
            (Requested | VerifiedPending, Reject) => Some(Rejected),
            (Requested | VerifiedPending, Dispute) => Some(Disputed),
            _ => Option::None,
        }
    }
}

/// A storefront sale. `partner_id = None` means a direct, non-affiliate
/// sale. Commission counts toward the partner's withdrawable balance only
/// once `now >= matures_at` and the refund was not approved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub partner_id: Option<String>,
    pub amount: f64,
    pub commission: f64,
    pub status: OrderStatus,
    pub refund_status: RefundStatus,
    pub created_at: i64,
    /// `created_at + MATURITY_DAYS`.
    pub matures_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrder {
    #[serde(default)]
    pub partner_id: Option<String>,
    pub amount: f64,
    #[serde(default)]
    pub commission: f64,
}
