use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

use crate::db::{AppState, queries};
use crate::models::Partner;
use crate::util::extract_bearer_token;

/// The authenticated partner, injected into /partner handlers.
#[derive(Clone)]
pub struct PartnerContext {
    pub partner: Partner,
}

/// Authenticate a partner from their access code (bearer token).
/// Deactivated partners are locked out regardless of credentials.
pub async fn partner_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let access_code = extract_bearer_token(request.headers()).ok_or(StatusCode::UNAUTHORIZED)?;
    let conn = state
        .db
        .get()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let partner = queries::get_partner_by_access_code(&conn, access_code)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::UNAUTHORIZED)?;
    // The downstream handler checks out its own connection; holding this
    // one across it would pin a pool slot per in-flight request.
    drop(conn);

    if !partner.is_active {
        return Err(StatusCode::FORBIDDEN);
    }

    request.extensions_mut().insert(PartnerContext { partner });
    Ok(next.run(request).await)
}
