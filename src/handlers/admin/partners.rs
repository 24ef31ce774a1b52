use axum::extract::State;
use serde::Serialize;

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Path};
use crate::models::{CreatePartner, Partner, UpdatePartnerOnboarding, WithdrawalRequest};
use crate::payout::withdrawal::{BalanceBreakdown, available_balance};

/// POST /admin/partners
pub async fn create_partner(
    State(state): State<AppState>,
    Json(body): Json<CreatePartner>,
) -> Result<Json<Partner>> {
    if body.slug.trim().is_empty() || body.coupon_code.trim().is_empty() {
        return Err(AppError::BadRequest("slug and coupon_code are required".into()));
    }
    if body.country.trim().len() != 2 {
        return Err(AppError::BadRequest(
            "country must be an ISO 3166-1 alpha-2 code".into(),
        ));
    }
    let conn = state.db.get()?;
    let partner = queries::create_partner(&conn, &body)?;
    tracing::info!(partner_id = %partner.id, slug = %partner.slug, "partner created");
    Ok(Json(partner))
}

/// GET /admin/partners
pub async fn list_partners(State(state): State<AppState>) -> Result<Json<Vec<Partner>>> {
    let conn = state.db.get()?;
    Ok(Json(queries::list_partners(&conn)?))
}

/// GET /admin/partners/{id}
pub async fn get_partner(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Partner>> {
    let conn = state.db.get()?;
    let partner = queries::get_partner_by_id(&conn, &id)?
        .ok_or_else(|| AppError::NotFound("Partner not found".into()))?;
    Ok(Json(partner))
}

/// PATCH /admin/partners/{id}/onboarding
///
/// Onboarding fields arrive asynchronously as the partner completes
/// external KYC.
pub async fn update_onboarding(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdatePartnerOnboarding>,
) -> Result<Json<Partner>> {
    let conn = state.db.get()?;
    queries::get_partner_by_id(&conn, &id)?
        .ok_or_else(|| AppError::NotFound("Partner not found".into()))?;

    queries::update_partner_onboarding(&conn, &id, &body)?;
    let partner = queries::get_partner_by_id(&conn, &id)?
        .ok_or_else(|| AppError::Internal("Partner disappeared".into()))?;
    Ok(Json(partner))
}

#[derive(Debug, Serialize)]
pub struct DeactivateResponse {
    pub deactivated: bool,
}

/// POST /admin/partners/{id}/deactivate
///
/// Administrative override; ignores balances, pending requests, and every
/// other invariant.
pub async fn deactivate_partner(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeactivateResponse>> {
    let conn = state.db.get()?;
    let deactivated = queries::set_partner_active(&conn, &id, false)?;
    if !deactivated {
        return Err(AppError::NotFound("Partner not found".into()));
    }
    tracing::info!(partner_id = %id, "partner deactivated");
    Ok(Json(DeactivateResponse { deactivated }))
}

/// GET /admin/partners/{id}/balance
pub async fn get_partner_balance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BalanceBreakdown>> {
    let conn = state.db.get()?;
    let partner = queries::get_partner_by_id(&conn, &id)?
        .ok_or_else(|| AppError::NotFound("Partner not found".into()))?;
    Ok(Json(available_balance(&conn, &partner)?))
}

/// GET /admin/partners/{id}/withdrawals
pub async fn list_partner_withdrawals(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<WithdrawalRequest>>> {
    let conn = state.db.get()?;
    queries::get_partner_by_id(&conn, &id)?
        .ok_or_else(|| AppError::NotFound("Partner not found".into()))?;
    Ok(Json(queries::list_withdrawals_for_partner(&conn, &id)?))
}
