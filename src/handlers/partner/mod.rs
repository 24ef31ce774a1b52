//! Partner dashboard API. Authenticated by access code via the
//! `partner_auth` middleware.

use axum::{
    Extension, Router,
    extract::State,
    middleware::from_fn_with_state,
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::db::{AppState, queries};
use crate::error::Result;
use crate::extractors::Json;
use crate::middleware::{PartnerContext, partner_auth};
use crate::models::{ClickEvent, Partner, WithdrawalRequest};
use crate::payout::withdrawal::{
    BalanceBreakdown, WithdrawalOutcome, available_balance, request_withdrawal,
};
use crate::payout::FeeBreakdown;

#[derive(Debug, Serialize)]
pub struct PartnerProfile {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub coupon_code: String,
    pub commission_percent: f64,
    pub click_bounty: f64,
    pub country: String,
    pub tax_form_verified: bool,
    pub stripe_onboarding_complete: bool,
}

impl From<&Partner> for PartnerProfile {
    fn from(p: &Partner) -> Self {
        PartnerProfile {
            id: p.id.clone(),
            slug: p.slug.clone(),
            name: p.name.clone(),
            coupon_code: p.coupon_code.clone(),
            commission_percent: p.commission_percent,
            click_bounty: p.click_bounty,
            country: p.country.clone(),
            tax_form_verified: p.tax_form_verified,
            stripe_onboarding_complete: p.stripe_onboarding_complete,
        }
    }
}

/// GET /partner/me
pub async fn get_profile(
    Extension(ctx): Extension<PartnerContext>,
) -> Result<Json<PartnerProfile>> {
    Ok(Json(PartnerProfile::from(&ctx.partner)))
}

/// GET /partner/balance
pub async fn get_balance(
    State(state): State<AppState>,
    Extension(ctx): Extension<PartnerContext>,
) -> Result<Json<BalanceBreakdown>> {
    let conn = state.db.get()?;
    Ok(Json(available_balance(&conn, &ctx.partner)?))
}

/// GET /partner/withdrawals
pub async fn list_withdrawals(
    State(state): State<AppState>,
    Extension(ctx): Extension<PartnerContext>,
) -> Result<Json<Vec<WithdrawalRequest>>> {
    let conn = state.db.get()?;
    Ok(Json(queries::list_withdrawals_for_partner(
        &conn,
        &ctx.partner.id,
    )?))
}

/// GET /partner/clicks
pub async fn list_clicks(
    State(state): State<AppState>,
    Extension(ctx): Extension<PartnerContext>,
) -> Result<Json<Vec<ClickEvent>>> {
    let conn = state.db.get()?;
    Ok(Json(queries::list_clicks_for_partner(
        &conn,
        &ctx.partner.id,
    )?))
}

#[derive(Debug, Deserialize)]
pub struct WithdrawBody {
    pub amount: f64,
}

#[derive(Debug, Serialize)]
pub struct WithdrawResponse {
    pub success: bool,
    pub request: WithdrawalRequest,
    pub fee_breakdown: FeeBreakdown,
}

/// POST /partner/withdrawals
///
/// Gate refusals are logical failures in a 200 payload with a stable
/// `error_code` (and `requires_onboarding` when KYC is the blocker).
pub async fn create_withdrawal(
    State(state): State<AppState>,
    Extension(ctx): Extension<PartnerContext>,
    Json(body): Json<WithdrawBody>,
) -> Result<axum::response::Response> {
    use axum::response::IntoResponse;

    let mut conn = state.db.get()?;
    let outcome = request_withdrawal(&mut conn, &ctx.partner.id, body.amount)?;

    let response = match outcome {
        WithdrawalOutcome::Accepted { request, fees, .. } => {
            state
                .email
                .notify_withdrawal_requested(&ctx.partner.email, &request);
            Json(WithdrawResponse {
                success: true,
                request,
                fee_breakdown: fees,
            })
            .into_response()
        }
        WithdrawalOutcome::Refused(refusal) => axum::Json(json!({
            "success": false,
            "error": refusal.message(),
            "error_code": refusal.error_code(),
            "requires_onboarding": refusal.requires_onboarding(),
        }))
        .into_response(),
    };
    Ok(response)
}

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(get_profile))
        .route("/balance", get(get_balance))
        .route("/clicks", get(list_clicks))
        .route("/withdrawals", get(list_withdrawals).post(create_withdrawal))
        .route_layer(from_fn_with_state(state, partner_auth))
}
