use axum::extract::State;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::db::{AppState, queries};
use crate::error::Result;
use crate::extractors::Json;
use crate::models::ClickKind;
use crate::util::extract_request_info;

#[derive(Debug, Deserialize)]
pub struct TrackClickRequest {
    pub partner_slug: String,
    pub kind: ClickKind,
}

#[derive(Debug, Serialize)]
pub struct TrackClickResponse {
    pub recorded: bool,
}

/// POST /track/click
///
/// Unknown or deactivated partners are silently dropped rather than
/// revealed to the caller.
pub async fn track_click(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<TrackClickRequest>,
) -> Result<Json<TrackClickResponse>> {
    let conn = state.db.get()?;

    let Some(partner) = queries::get_partner_by_slug(&conn, &request.partner_slug)? else {
        return Ok(Json(TrackClickResponse { recorded: false }));
    };
    if !partner.is_active {
        return Ok(Json(TrackClickResponse { recorded: false }));
    }

    let (ip, user_agent) = extract_request_info(&headers);
    queries::record_click(
        &conn,
        &partner.id,
        request.kind,
        ip.as_deref(),
        user_agent.as_deref(),
    )?;

    Ok(Json(TrackClickResponse { recorded: true }))
}
