use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::db::AppState;
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::licensing::activation::{ActivationInput, ActivationOutcome, activate};
use crate::models::DevicePlatform;
use crate::util::extract_request_info;

#[derive(Debug, Deserialize)]
pub struct ActivateRequest {
    pub license_code: String,
    pub device_fingerprint: String,
    #[serde(default)]
    pub device_name: Option<String>,
    pub device_type: DevicePlatform,
}

#[derive(Debug, Serialize)]
pub struct ActivateResponse {
    pub success: bool,
    pub remaining_activations: i64,
    pub reactivated: bool,
}

/// POST /licenses/activate
///
/// Device-limit failures come back as 403 with upsell metadata and a
/// pre-filled support-claim URL; license faults are logical failures in a
/// 200 payload, mirroring validate.
pub async fn activate_device(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ActivateRequest>,
) -> Result<Response> {
    if request.license_code.trim().is_empty() {
        return Err(AppError::BadRequest("Missing license code".into()));
    }
    if request.device_fingerprint.trim().is_empty() {
        return Err(AppError::BadRequest("Missing device fingerprint".into()));
    }

    let (ip, user_agent) = extract_request_info(&headers);
    let mut conn = state.db.get()?;

    let outcome = activate(
        &mut conn,
        &state.base_url,
        &ActivationInput {
            code: &request.license_code,
            fingerprint: &request.device_fingerprint,
            device_name: request.device_name.as_deref(),
            platform: request.device_type,
            ip: ip.as_deref(),
            user_agent: user_agent.as_deref(),
        },
    )?;

    let response = match outcome {
        ActivationOutcome::Activated {
            remaining_activations,
            reactivated,
            ..
        } => Json(ActivateResponse {
            success: true,
            remaining_activations,
            reactivated,
        })
        .into_response(),
        ActivationOutcome::LimitExceeded {
            max_devices,
            support_claim_url,
            upsell,
        } => (
            StatusCode::FORBIDDEN,
            axum::Json(json!({
                "success": false,
                "error": format!(
                    "Device limit reached ({max_devices}/{max_devices}). \
                     Deactivate a device or add a slot."
                ),
                "error_code": "DEVICE_LIMIT_EXCEEDED",
                "support_claim_url": support_claim_url,
                "upsell": upsell,
            })),
        )
            .into_response(),
        ActivationOutcome::Invalid(fault) => axum::Json(json!({
            "success": false,
            "error": fault.message(),
            "error_code": fault.error_code(),
        }))
        .into_response(),
    };
    Ok(response)
}
