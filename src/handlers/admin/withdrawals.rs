use axum::extract::State;
use serde::{Deserialize, Serialize};
use strum::EnumString;

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Path};
use crate::models::{PayoutMethod, WithdrawalRequest};
use crate::util::current_month;

#[derive(Debug, Clone, Copy, Deserialize, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WithdrawalAction {
    Approve,
    Reject,
}

#[derive(Debug, Deserialize)]
pub struct DecideWithdrawalBody {
    pub action: WithdrawalAction,
    pub decided_by: String,
}

#[derive(Debug, Serialize)]
pub struct DecideWithdrawalResponse {
    pub success: bool,
    pub request: WithdrawalRequest,
}

/// PATCH /admin/withdrawals/{id}
///
/// Approval additionally attempts the real funds transfer for Stripe
/// Connect partners. Transfer success or failure lands on the request as
/// PAID or FAILED; the fee breakdown computed at admission is never
/// recalculated.
pub async fn decide_withdrawal(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<DecideWithdrawalBody>,
) -> Result<Json<DecideWithdrawalResponse>> {
    if body.decided_by.trim().is_empty() {
        return Err(AppError::BadRequest("decided_by is required".into()));
    }

    let conn = state.db.get()?;
    let request = queries::get_withdrawal_by_id(&conn, &id)?
        .ok_or_else(|| AppError::NotFound("Withdrawal request not found".into()))?;
    let partner = queries::get_partner_by_id(&conn, &request.partner_id)?
        .ok_or_else(|| AppError::Internal("Partner disappeared".into()))?;

    match body.action {
        WithdrawalAction::Reject => {
            if !queries::reject_withdrawal(&conn, &id, &body.decided_by)? {
                return Err(AppError::Conflict(
                    "Request has already been decided".into(),
                ));
            }
        }
        WithdrawalAction::Approve => {
            if !queries::approve_withdrawal(&conn, &id, &body.decided_by)? {
                return Err(AppError::Conflict(
                    "Request has already been decided".into(),
                ));
            }

            if partner.payout_method == PayoutMethod::StripeConnect {
                let account = partner.stripe_account_id.as_deref().ok_or_else(|| {
                    AppError::Internal("Approved partner has no Stripe account".into())
                })?;
                let amount_cents = (request.amount_to_deposit * 100.0).round() as i64;
                let description = format!("Bindery partner payout {}", request.id);

                match state
                    .transfers
                    .create_transfer(account, amount_cents, "usd", &description)
                    .await
                {
                    Ok(transfer_id) => {
                        queries::mark_withdrawal_paid(&conn, &id, &transfer_id)?;
                        queries::set_last_payout_month(&conn, &partner.id, &current_month())?;
                    }
                    Err(e) => {
                        tracing::error!(request_id = %id, error = %e, "payout transfer failed");
                        queries::mark_withdrawal_failed(&conn, &id, &e.to_string())?;
                    }
                }
            }
            // Non-Stripe methods are paid out-of-band; the request stays
            // APPROVED until an operator marks it manually.
        }
    }

    let request = queries::get_withdrawal_by_id(&conn, &id)?
        .ok_or_else(|| AppError::Internal("Request disappeared".into()))?;
    state
        .email
        .notify_withdrawal_decided(&partner.email, &request);

    Ok(Json(DecideWithdrawalResponse {
        success: true,
        request,
    }))
}

#[derive(Debug, Deserialize)]
pub struct MarkPaidBody {
    pub transfer_id: String,
}

/// POST /admin/withdrawals/{id}/mark-paid
///
/// Manual settlement for non-Stripe payout methods.
pub async fn mark_paid(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<MarkPaidBody>,
) -> Result<Json<DecideWithdrawalResponse>> {
    let conn = state.db.get()?;
    let request = queries::get_withdrawal_by_id(&conn, &id)?
        .ok_or_else(|| AppError::NotFound("Withdrawal request not found".into()))?;

    if !queries::mark_withdrawal_paid(&conn, &id, &body.transfer_id)? {
        return Err(AppError::Conflict("Request is not in APPROVED state".into()));
    }
    queries::set_last_payout_month(&conn, &request.partner_id, &current_month())?;

    let request = queries::get_withdrawal_by_id(&conn, &id)?
        .ok_or_else(|| AppError::Internal("Request disappeared".into()))?;
    Ok(Json(DecideWithdrawalResponse {
        success: true,
        request,
    }))
}
