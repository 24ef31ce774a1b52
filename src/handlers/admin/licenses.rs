use axum::extract::State;
use serde::Serialize;

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Path};
use crate::licensing::normalize_code;
use crate::models::{CreateLicense, DeviceActivation, License};

#[derive(Debug, Serialize)]
pub struct LicenseWithDevices {
    #[serde(flatten)]
    pub license: License,
    pub devices: Vec<DeviceActivation>,
    pub active_devices: i64,
}

/// POST /admin/licenses
pub async fn create_license(
    State(state): State<AppState>,
    Json(body): Json<CreateLicense>,
) -> Result<Json<License>> {
    if body.email.trim().is_empty() {
        return Err(AppError::BadRequest("email is required".into()));
    }
    let conn = state.db.get()?;
    let license = queries::create_license(&conn, &body)?;
    tracing::info!(license_id = %license.id, "license issued");
    Ok(Json(license))
}

/// GET /admin/licenses/{code}
pub async fn get_license(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<LicenseWithDevices>> {
    let conn = state.db.get()?;
    let license = queries::get_license_by_code(&conn, &normalize_code(&code))?
        .ok_or_else(|| AppError::NotFound("License not found".into()))?;
    let devices = queries::list_activations_for_license(&conn, &license.id)?;
    let active_devices = queries::count_active_activations(&conn, &license.id)?;
    Ok(Json(LicenseWithDevices {
        license,
        devices,
        active_devices,
    }))
}

#[derive(Debug, Serialize)]
pub struct RevokeResponse {
    pub revoked: bool,
    pub devices_deactivated: usize,
}

/// POST /admin/licenses/{code}/revoke
///
/// Revocation also deactivates every active device of the license.
pub async fn revoke_license(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<RevokeResponse>> {
    let conn = state.db.get()?;
    let license = queries::get_license_by_code(&conn, &normalize_code(&code))?
        .ok_or_else(|| AppError::NotFound("License not found".into()))?;

    queries::set_license_revoked(&conn, &license.id, true)?;
    let devices_deactivated = queries::deactivate_all_activations(&conn, &license.id)?;
    tracing::info!(license_id = %license.id, devices_deactivated, "license revoked");

    Ok(Json(RevokeResponse {
        revoked: true,
        devices_deactivated,
    }))
}

/// POST /admin/licenses/{code}/unrevoke
pub async fn unrevoke_license(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<License>> {
    let conn = state.db.get()?;
    let license = queries::get_license_by_code(&conn, &normalize_code(&code))?
        .ok_or_else(|| AppError::NotFound("License not found".into()))?;

    queries::set_license_revoked(&conn, &license.id, false)?;
    let license = queries::get_license_by_id(&conn, &license.id)?
        .ok_or_else(|| AppError::Internal("License disappeared".into()))?;
    Ok(Json(license))
}
