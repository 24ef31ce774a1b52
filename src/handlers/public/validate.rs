use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::db::AppState;
use crate::error::{AppError, Result};
use crate::extractors::{Json, Query};
use crate::licensing::{Validation, validate_code};

#[derive(Debug, Deserialize)]
pub struct ValidateQuery {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub license_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ValidateBody {
    pub license_code: String,
}

/// Validity is in-payload; HTTP 200 covers both outcomes. Only malformed
/// input gets a non-200.
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_devices: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_device_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
}

fn run_validation(state: &AppState, raw_code: &str) -> Result<ValidateResponse> {
    let conn = state.db.get()?;
    let response = match validate_code(&conn, raw_code)? {
        Validation::Valid(v) => ValidateResponse {
            valid: true,
            license_id: Some(v.license.id),
            email: Some(v.license.email),
            customer_name: v.license.customer_name,
            max_devices: Some(v.license.max_devices),
            active_device_count: Some(v.active_devices),
            error: None,
            error_code: None,
        },
        Validation::Invalid(fault) => ValidateResponse {
            valid: false,
            license_id: None,
            email: None,
            customer_name: None,
            max_devices: None,
            active_device_count: None,
            error: Some(fault.message().to_string()),
            error_code: Some(fault.error_code()),
        },
    };
    Ok(response)
}

/// GET /licenses/validate?code=... (or ?license_code=...)
pub async fn validate_license_get(
    State(state): State<AppState>,
    Query(query): Query<ValidateQuery>,
) -> Result<Json<ValidateResponse>> {
    let code = query
        .license_code
        .or(query.code)
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing license code".into()))?;
    Ok(Json(run_validation(&state, &code)?))
}

/// POST /licenses/validate
pub async fn validate_license_post(
    State(state): State<AppState>,
    Json(body): Json<ValidateBody>,
) -> Result<Json<ValidateResponse>> {
    if body.license_code.trim().is_empty() {
        return Err(AppError::BadRequest("Missing license code".into()));
    }
    Ok(Json(run_validation(&state, &body.license_code)?))
}
