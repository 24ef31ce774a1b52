use axum::extract::State;
use serde::{Deserialize, Serialize};
use strum::EnumString;

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Path, Query};
use crate::licensing::extension::{approve_claim, reject_claim};
use crate::models::{ClaimStatus, ExtensionClaim};

#[derive(Debug, Deserialize)]
pub struct ListClaimsQuery {
    #[serde(default)]
    pub status: Option<ClaimStatus>,
}

/// GET /admin/extensions?status=pending
pub async fn list_claims(
    State(state): State<AppState>,
    Query(query): Query<ListClaimsQuery>,
) -> Result<Json<Vec<ExtensionClaim>>> {
    let conn = state.db.get()?;
    Ok(Json(queries::list_claims(&conn, query.status)?))
}

#[derive(Debug, Clone, Copy, Deserialize, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ClaimAction {
    Approve,
    Reject,
}

/// Decisions always carry an explicit actor identity; there is no
/// implicit default.
#[derive(Debug, Deserialize)]
pub struct DecideClaimBody {
    pub action: ClaimAction,
    pub decided_by: String,
}

#[derive(Debug, Serialize)]
pub struct DecideClaimResponse {
    pub success: bool,
    pub claim_number: String,
    pub status: ClaimStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_max_devices: Option<i32>,
}

/// PATCH /admin/extensions/{claim_number}
pub async fn decide_claim(
    State(state): State<AppState>,
    Path(claim_number): Path<String>,
    Json(body): Json<DecideClaimBody>,
) -> Result<Json<DecideClaimResponse>> {
    if body.decided_by.trim().is_empty() {
        return Err(AppError::BadRequest("decided_by is required".into()));
    }

    let mut conn = state.db.get()?;
    let response = match body.action {
        ClaimAction::Approve => {
            let approved = approve_claim(&mut conn, &claim_number, &body.decided_by, false)?;
            DecideClaimResponse {
                success: true,
                claim_number: approved.claim_number,
                status: ClaimStatus::Approved,
                new_max_devices: Some(approved.new_max_devices),
            }
        }
        ClaimAction::Reject => {
            reject_claim(&mut conn, &claim_number, &body.decided_by)?;
            DecideClaimResponse {
                success: true,
                claim_number: claim_number.clone(),
                status: ClaimStatus::Rejected,
                new_max_devices: None,
            }
        }
    };

    if let Some(claim) = queries::get_claim_by_number(&conn, &response.claim_number)? {
        state
            .email
            .notify_extension_decided(&claim, matches!(body.action, ClaimAction::Approve));
    }

    Ok(Json(response))
}
