mod activate;
mod devices;
mod extensions;
mod track;
mod validate;

pub use activate::*;
pub use devices::*;
pub use extensions::*;
pub use track::*;
pub use validate::*;

use axum::{
    Json, Router,
    routing::{get, post},
};
use serde::Serialize;

use crate::db::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route(
            "/licenses/validate",
            get(validate_license_get).post(validate_license_post),
        )
        .route("/licenses/activate", post(activate_device))
        .route("/licenses/devices", get(list_devices))
        .route("/licenses/devices/deactivate", post(deactivate_device))
        .route("/licenses/extensions", post(request_license_extension))
        .route("/track/click", post(track_click))
}
