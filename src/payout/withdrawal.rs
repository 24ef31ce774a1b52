//! Commission maturity and the withdrawal guard.
//!
//! Gate order (first failing gate wins): partner type, tax form, Stripe
//! onboarding, jurisdiction minimum, available balance. The balance check
//! and request insertion run inside an IMMEDIATE transaction so two
//! concurrent requests cannot both draw down the same balance.

use chrono::Utc;
use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;

use crate::db::queries;
use crate::error::{AppError, Result};
use crate::models::{Partner, PartnerType, WithdrawalRequest};
use crate::util::current_month;

use super::fees::{self, FeeBreakdown, FeeCheck, Jurisdiction, round_cents};

#[derive(Debug, Clone, Serialize)]
pub struct BalanceBreakdown {
    /// Commission from completed, non-refunded orders past the 16-day
    /// maturity window.
    pub matured_commission: f64,
    /// Retailer clicks times the partner's bounty; no maturity delay.
    pub click_bounty_earned: f64,
    /// Sum of this partner's PENDING and APPROVED withdrawal requests.
    pub reserved: f64,
    pub available: f64,
}

/// Compute the partner's withdrawable balance as of `now`.
pub fn available_balance(conn: &Connection, partner: &Partner) -> Result<BalanceBreakdown> {
    let now = Utc::now().timestamp();
    let matured_commission = round_cents(queries::sum_matured_commission(conn, &partner.id, now)?);
    let clicks = queries::count_bounty_clicks(conn, &partner.id)?;
    let click_bounty_earned = round_cents(clicks as f64 * partner.click_bounty);
    let reserved = round_cents(queries::sum_reserved_withdrawals(conn, &partner.id)?);
    let available = round_cents(matured_commission + click_bounty_earned - reserved);
    Ok(BalanceBreakdown {
        matured_commission,
        click_bounty_earned,
        reserved,
        available,
    })
}

/// Why a withdrawal was refused. These are domain outcomes with stable
/// error codes, not transport errors.
#[derive(Debug, Clone, PartialEq)]
pub enum WithdrawalRefusal {
    FlatFeePartner,
    TaxFormRequired,
    StripeOnboardingRequired,
    BelowMinimum { minimum: f64 },
    InsufficientBalance { available: f64 },
    NonPositiveNet,
}

impl WithdrawalRefusal {
    pub fn error_code(&self) -> &'static str {
        match self {
            WithdrawalRefusal::FlatFeePartner => "FLAT_FEE_INELIGIBLE",
            WithdrawalRefusal::TaxFormRequired | WithdrawalRefusal::StripeOnboardingRequired => {
                "ONBOARDING_REQUIRED"
            }
            WithdrawalRefusal::BelowMinimum { .. } => "BELOW_MINIMUM",
            WithdrawalRefusal::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            WithdrawalRefusal::NonPositiveNet => "INSUFFICIENT_AMOUNT",
        }
    }

    /// True when the partner must complete external KYC before retrying.
    pub fn requires_onboarding(&self) -> bool {
        matches!(
            self,
            WithdrawalRefusal::TaxFormRequired | WithdrawalRefusal::StripeOnboardingRequired
        )
    }

    pub fn message(&self) -> String {
        match self {
            WithdrawalRefusal::FlatFeePartner => {
                "Flat-fee partners are not eligible for commission withdrawal".to_string()
            }
            WithdrawalRefusal::TaxFormRequired => {
                "A verified tax form is required before withdrawal".to_string()
            }
            WithdrawalRefusal::StripeOnboardingRequired => {
                "Stripe onboarding must be completed before withdrawal".to_string()
            }
            WithdrawalRefusal::BelowMinimum { minimum } => {
                format!("Minimum withdrawal for your region is ${minimum:.2}")
            }
            WithdrawalRefusal::InsufficientBalance { available } => {
                format!("Requested amount exceeds your available balance of ${available:.2}")
            }
            WithdrawalRefusal::NonPositiveNet => {
                "Requested amount does not cover the payout fees".to_string()
            }
        }
    }
}

#[derive(Debug)]
pub enum WithdrawalOutcome {
    Accepted {
        request: WithdrawalRequest,
        fees: FeeBreakdown,
        balance: BalanceBreakdown,
    },
    Refused(WithdrawalRefusal),
}

/// Admit or refuse a withdrawal request for `amount`.
///
/// On success the computed fee breakdown is persisted verbatim on the new
/// PENDING request and returned to the caller without further rounding.
pub fn request_withdrawal(
    conn: &mut Connection,
    partner_id: &str,
    amount: f64,
) -> Result<WithdrawalOutcome> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::BadRequest("amount must be a positive number".into()));
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let partner = queries::get_partner_by_id(&tx, partner_id)?
        .ok_or_else(|| AppError::NotFound("Partner not found".into()))?;

    // Gate 1: partner type.
    if partner.partner_type == PartnerType::FlatFee {
        return Ok(WithdrawalOutcome::Refused(WithdrawalRefusal::FlatFeePartner));
    }
    // Gate 2: tax form.
    if !partner.tax_form_verified {
        return Ok(WithdrawalOutcome::Refused(WithdrawalRefusal::TaxFormRequired));
    }
    // Gate 3: Stripe onboarding, including a usable account id.
    if !partner.stripe_onboarding_complete || partner.stripe_account_id.is_none() {
        return Ok(WithdrawalOutcome::Refused(
            WithdrawalRefusal::StripeOnboardingRequired,
        ));
    }
    // Gate 4: jurisdiction floor.
    let minimum = Jurisdiction::resolve(&partner.country).min_withdrawal();
    if amount < minimum {
        return Ok(WithdrawalOutcome::Refused(WithdrawalRefusal::BelowMinimum {
            minimum,
        }));
    }
    // Gate 5: available balance, net of reserved requests.
    let balance = available_balance(&tx, &partner)?;
    if amount > balance.available {
        return Ok(WithdrawalOutcome::Refused(
            WithdrawalRefusal::InsufficientBalance {
                available: balance.available,
            },
        ));
    }

    // The monthly fee is charged at most once per calendar month. A
    // same-month request that already carries it (still reserved, or paid)
    // satisfies the charge even before `last_payout_month` advances.
    let month = current_month();
    let monthly_charged = partner.last_payout_month.as_deref() == Some(month.as_str())
        || queries::monthly_fee_already_charged(&tx, &partner.id, &month)?;
    let effective_last_payout = if monthly_charged {
        Some(month.as_str())
    } else {
        partner.last_payout_month.as_deref()
    };
    let breakdown =
        fees::calculate_net_payout_at(amount, &partner.country, effective_last_payout, &month);
    match breakdown.error {
        Some(FeeCheck::BelowMinimum { minimum }) => {
            return Ok(WithdrawalOutcome::Refused(WithdrawalRefusal::BelowMinimum {
                minimum,
            }));
        }
        Some(FeeCheck::NonPositiveNet) => {
            return Ok(WithdrawalOutcome::Refused(WithdrawalRefusal::NonPositiveNet));
        }
        None => {}
    }

    let request = queries::create_withdrawal(
        &tx,
        &queries::NewWithdrawal {
            partner_id: &partner.id,
            amount_requested: breakdown.amount_requested,
            payout_fee: breakdown.payout_fee,
            monthly_fee: breakdown.monthly_fee,
            cross_border_fee: breakdown.cross_border_fee,
            total_fees: breakdown.total_fees,
            amount_to_deposit: breakdown.amount_to_deposit,
            payout_method: partner.payout_method,
        },
    )?;
    tx.commit()?;

    tracing::info!(
        partner_id = %partner.id,
        amount,
        net = breakdown.amount_to_deposit,
        "withdrawal request admitted"
    );
    Ok(WithdrawalOutcome::Accepted {
        request,
        fees: breakdown,
        balance,
    })
}
