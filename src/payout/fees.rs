//! Payout fee schedule: a pure, deterministic translation of a gross
//! withdrawal request into a net deposit amount.
//!
//! Jurisdiction resolution order: exact country overrides (Nigeria, United
//! Kingdom), then the EU membership list, then the US baseline, then the
//! generic international bucket. First match wins; tiers never stack.

use serde::Serialize;

/// Flat fee per payout request, all jurisdictions.
pub const PAYOUT_FEE: f64 = 0.25;

/// Flat monthly active fee, charged at most once per calendar month.
pub const MONTHLY_ACTIVE_FEE: f64 = 2.00;

/// EU member states (ISO 3166-1 alpha-2).
const EU_MEMBERS: &[&str] = &[
    "AT", "BE", "BG", "HR", "CY", "CZ", "DK", "EE", "FI", "FR", "DE", "GR", "HU", "IE", "IT",
    "LV", "LT", "LU", "MT", "NL", "PL", "PT", "RO", "SK", "SI", "ES", "SE",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Jurisdiction {
    UnitedStates,
    UnitedKingdom,
    EuropeanUnion,
    Nigeria,
    International,
}

impl Jurisdiction {
    pub fn resolve(country: &str) -> Self {
        let code = country.trim().to_ascii_uppercase();
        match code.as_str() {
            "NG" => Jurisdiction::Nigeria,
            "GB" | "UK" => Jurisdiction::UnitedKingdom,
            c if EU_MEMBERS.contains(&c) => Jurisdiction::EuropeanUnion,
            "US" => Jurisdiction::UnitedStates,
            _ => Jurisdiction::International,
        }
    }

    /// FX/transfer cost fraction deducted from international payouts.
    pub fn cross_border_percent(self) -> f64 {
        match self {
            Jurisdiction::UnitedStates => 0.0,
            Jurisdiction::UnitedKingdom => 0.005,
            Jurisdiction::EuropeanUnion => 0.008,
            Jurisdiction::International => 0.010,
            Jurisdiction::Nigeria => 0.015,
        }
    }

    pub fn min_withdrawal(self) -> f64 {
        match self {
            Jurisdiction::UnitedStates => 10.0,
            Jurisdiction::UnitedKingdom | Jurisdiction::EuropeanUnion => 25.0,
            Jurisdiction::Nigeria | Jurisdiction::International => 50.0,
        }
    }
}

/// Round to 2 decimal places. Applied to every reported component, not
/// only the total, so the displayed breakdown never drifts by a cent.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Checks reported (not thrown) alongside the breakdown; the caller
/// decides whether to block the request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeeCheck {
    BelowMinimum { minimum: f64 },
    NonPositiveNet,
}

impl FeeCheck {
    pub fn error_code(self) -> &'static str {
        match self {
            FeeCheck::BelowMinimum { .. } => "BELOW_MINIMUM",
            FeeCheck::NonPositiveNet => "INSUFFICIENT_AMOUNT",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeeBreakdown {
    pub amount_requested: f64,
    pub payout_fee: f64,
    pub monthly_fee: f64,
    pub cross_border_fee: f64,
    pub total_fees: f64,
    pub amount_to_deposit: f64,
    pub jurisdiction: Jurisdiction,
    pub min_withdrawal: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FeeCheck>,
}

/// Fee calculation with an explicit "current month", fully deterministic.
/// The caller decides what month it is and whether the monthly fee was
/// already satisfied.
pub fn calculate_net_payout_at(
    amount_requested: f64,
    country: &str,
    last_payout_month: Option<&str>,
    month: &str,
) -> FeeBreakdown {
    let jurisdiction = Jurisdiction::resolve(country);

    let payout_fee = PAYOUT_FEE;
    let monthly_fee = if last_payout_month == Some(month) {
        0.0
    } else {
        MONTHLY_ACTIVE_FEE
    };
    let cross_border_fee = round_cents(amount_requested * jurisdiction.cross_border_percent());
    let total_fees = round_cents(payout_fee + monthly_fee + cross_border_fee);
    let amount_to_deposit = round_cents(amount_requested - total_fees);

    let min_withdrawal = jurisdiction.min_withdrawal();
    let error = if amount_requested < min_withdrawal {
        Some(FeeCheck::BelowMinimum {
            minimum: min_withdrawal,
        })
    } else if amount_to_deposit <= 0.0 {
        Some(FeeCheck::NonPositiveNet)
    } else {
        None
    };

    FeeBreakdown {
        amount_requested,
        payout_fee,
        monthly_fee,
        cross_border_fee,
        total_fees,
        amount_to_deposit,
        jurisdiction,
        min_withdrawal,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONTH: &str = "2026-08";

    #[test]
    fn us_first_payout_of_month() {
        let b = calculate_net_payout_at(100.0, "US", None, MONTH);
        assert_eq!(b.jurisdiction, Jurisdiction::UnitedStates);
        assert_eq!(b.payout_fee, 0.25);
        assert_eq!(b.monthly_fee, 2.00);
        assert_eq!(b.cross_border_fee, 0.0);
        assert_eq!(b.amount_to_deposit, 97.75);
        assert!(b.error.is_none());
    }

    #[test]
    fn us_repeat_payout_same_month_skips_monthly_fee() {
        let b = calculate_net_payout_at(100.0, "US", Some(MONTH), MONTH);
        assert_eq!(b.monthly_fee, 0.0);
        assert_eq!(b.amount_to_deposit, 99.75);
    }

    #[test]
    fn stale_last_payout_month_charges_monthly_fee() {
        let b = calculate_net_payout_at(100.0, "US", Some("2026-07"), MONTH);
        assert_eq!(b.monthly_fee, 2.00);
    }

    #[test]
    fn nigeria_cross_border() {
        let b = calculate_net_payout_at(100.0, "NG", None, MONTH);
        assert_eq!(b.jurisdiction, Jurisdiction::Nigeria);
        assert_eq!(b.cross_border_fee, 1.50);
        assert_eq!(b.amount_to_deposit, 96.25);
        assert!(b.error.is_none());
    }

    #[test]
    fn uk_override_beats_everything() {
        for code in ["GB", "UK", "gb"] {
            let b = calculate_net_payout_at(100.0, code, Some(MONTH), MONTH);
            assert_eq!(b.jurisdiction, Jurisdiction::UnitedKingdom);
            assert_eq!(b.cross_border_fee, 0.50);
            assert_eq!(b.min_withdrawal, 25.0);
        }
    }

    #[test]
    fn eu_member_resolves_to_eu_bucket() {
        let b = calculate_net_payout_at(200.0, "DE", Some(MONTH), MONTH);
        assert_eq!(b.jurisdiction, Jurisdiction::EuropeanUnion);
        assert_eq!(b.cross_border_fee, 1.60);
        assert_eq!(b.min_withdrawal, 25.0);
    }

    #[test]
    fn unknown_country_falls_to_international() {
        let b = calculate_net_payout_at(100.0, "JP", Some(MONTH), MONTH);
        assert_eq!(b.jurisdiction, Jurisdiction::International);
        assert_eq!(b.cross_border_fee, 1.00);
        assert_eq!(b.min_withdrawal, 50.0);
    }

    #[test]
    fn below_minimum_is_reported_not_thrown() {
        let b = calculate_net_payout_at(5.0, "US", Some(MONTH), MONTH);
        assert_eq!(b.error, Some(FeeCheck::BelowMinimum { minimum: 10.0 }));
        // The breakdown is still fully populated.
        assert_eq!(b.payout_fee, 0.25);
    }

    #[test]
    fn components_are_rounded_individually() {
        // 0.8% of 33.33 = 0.26664 -> 0.27, not carried at full precision.
        let b = calculate_net_payout_at(33.33, "FR", Some(MONTH), MONTH);
        assert_eq!(b.cross_border_fee, 0.27);
        assert_eq!(b.total_fees, 0.52);
        assert_eq!(b.amount_to_deposit, 32.81);
    }

    #[test]
    fn determinism() {
        let a = calculate_net_payout_at(73.19, "NG", Some("2025-12"), MONTH);
        let b = calculate_net_payout_at(73.19, "NG", Some("2025-12"), MONTH);
        assert_eq!(a.amount_to_deposit, b.amount_to_deposit);
        assert_eq!(a.total_fees, b.total_fees);
    }
}
