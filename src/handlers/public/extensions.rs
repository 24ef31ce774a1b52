use axum::extract::State;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::db::AppState;
use crate::error::Result;
use crate::extractors::Json;
use crate::licensing::extension::{ExtensionOutcome, ExtensionRequest, request_extension};

#[derive(Debug, Deserialize)]
pub struct ExtensionRequestBody {
    pub license_code: String,
    pub email: String,
    pub reason: String,
    #[serde(default)]
    pub receipt_info: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExtensionRequestResponse {
    pub success: bool,
    pub claim_number: String,
    pub requires_review: bool,
}

/// POST /licenses/extensions
pub async fn request_license_extension(
    State(state): State<AppState>,
    Json(body): Json<ExtensionRequestBody>,
) -> Result<axum::response::Response> {
    use axum::response::IntoResponse;

    let mut conn = state.db.get()?;
    let outcome = request_extension(
        &mut conn,
        &ExtensionRequest {
            code: &body.license_code,
            email: &body.email,
            reason: &body.reason,
            receipt_info: body.receipt_info.as_deref(),
        },
    )?;

    let response = match outcome {
        ExtensionOutcome::Created(claim) => {
            state.email.notify_extension_received(&claim);
            Json(ExtensionRequestResponse {
                success: true,
                claim_number: claim.claim_number,
                requires_review: claim.requires_review,
            })
            .into_response()
        }
        ExtensionOutcome::Invalid(fault) => axum::Json(json!({
            "success": false,
            "error": fault.message(),
            "error_code": fault.error_code(),
        }))
        .into_response(),
    };
    Ok(response)
}
