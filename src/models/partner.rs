use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PartnerType {
    /// Earns a percentage of referred sales; eligible for withdrawal.
    RevShare,
    /// Paid a negotiated flat fee out-of-band; never withdraws commission.
    FlatFee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PayoutMethod {
    StripeConnect,
    Paypal,
    BankTransfer,
}

/// An external promoter earning commission or flat fees for referred
/// sales, identified by coupon/access codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partner {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub email: String,
    pub coupon_code: String,
    /// Bearer credential for the partner dashboard API.
    pub access_code: String,
    pub partner_type: PartnerType,
    pub commission_percent: f64,
    /// Currency per qualifying click; matures immediately.
    pub click_bounty: f64,
    pub discount_percent: f64,
    /// ISO 3166-1 alpha-2, drives the payout fee schedule.
    pub country: String,
    pub payout_method: PayoutMethod,
    pub stripe_account_id: Option<String>,
    pub stripe_onboarding_complete: bool,
    pub tax_form_verified: bool,
    /// `YYYY-MM` of the most recent paid-out month, for the monthly fee.
    pub last_payout_month: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreatePartner {
    pub slug: String,
    pub name: String,
    pub email: String,
    pub coupon_code: String,
    pub partner_type: PartnerType,
    pub commission_percent: f64,
    #[serde(default)]
    pub click_bounty: f64,
    #[serde(default)]
    pub discount_percent: f64,
    pub country: String,
    pub payout_method: PayoutMethod,
}

/// Onboarding fields updated asynchronously as the partner completes
/// external KYC.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePartnerOnboarding {
    #[serde(default)]
    pub tax_form_verified: Option<bool>,
    #[serde(default)]
    pub stripe_onboarding_complete: Option<bool>,
    #[serde(default)]
    pub stripe_account_id: Option<String>,
}

/// A qualifying partner click, attributed for the click bounty.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumIter, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ClickKind {
    Amazon,
    BookBaby,
    /// Storefront visit; tracked but carries no bounty.
    Visit,
}

impl ClickKind {
    /// Only retailer clicks earn the bounty.
    pub fn earns_bounty(self) -> bool {
        matches!(self, ClickKind::Amazon | ClickKind::BookBaby)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickEvent {
    pub id: String,
    pub partner_id: String,
    pub kind: ClickKind,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: i64,
}
