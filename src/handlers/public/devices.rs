use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Query};
use crate::licensing::activation::deactivate;
use crate::licensing::normalize_code;
use crate::models::DevicePlatform;

#[derive(Debug, Deserialize)]
pub struct DevicesQuery {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct DeviceInfo {
    pub fingerprint: String,
    pub device_name: Option<String>,
    pub platform: DevicePlatform,
    pub is_active: bool,
    pub activated_at: i64,
    pub deactivated_at: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct DevicesResponse {
    pub devices: Vec<DeviceInfo>,
    pub max_devices: i32,
    pub active_devices: i64,
}

/// GET /licenses/devices?code=...
pub async fn list_devices(
    State(state): State<AppState>,
    Query(query): Query<DevicesQuery>,
) -> Result<Json<DevicesResponse>> {
    let conn = state.db.get()?;

    let code = normalize_code(&query.code);
    let license = queries::get_license_by_code(&conn, &code)?
        .ok_or_else(|| AppError::NotFound("License not found".into()))?;

    let devices = queries::list_activations_for_license(&conn, &license.id)?;
    let active_devices = queries::count_active_activations(&conn, &license.id)?;

    Ok(Json(DevicesResponse {
        devices: devices
            .into_iter()
            .map(|d| DeviceInfo {
                fingerprint: d.fingerprint,
                device_name: d.device_name,
                platform: d.platform,
                is_active: d.is_active,
                activated_at: d.activated_at,
                deactivated_at: d.deactivated_at,
            })
            .collect(),
        max_devices: license.max_devices,
        active_devices,
    }))
}

#[derive(Debug, Deserialize)]
pub struct DeactivateRequest {
    pub license_code: String,
    pub device_fingerprint: String,
}

#[derive(Debug, Serialize)]
pub struct DeactivateResponse {
    pub deactivated: bool,
    pub remaining_devices: i64,
}

/// POST /licenses/devices/deactivate
///
/// `deactivated` is false when the device was already inactive.
pub async fn deactivate_device(
    State(state): State<AppState>,
    Json(request): Json<DeactivateRequest>,
) -> Result<Json<DeactivateResponse>> {
    let mut conn = state.db.get()?;

    let result = deactivate(&mut conn, &request.license_code, &request.device_fingerprint)?
        .ok_or_else(|| AppError::NotFound("License or device not found".into()))?;

    Ok(Json(DeactivateResponse {
        deactivated: result.deactivated,
        remaining_devices: result.remaining_devices,
    }))
}
