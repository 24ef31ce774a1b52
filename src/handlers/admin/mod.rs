//! Operator API. Every route requires the configured admin bearer token.

mod extensions;
mod licenses;
mod orders;
mod partners;
mod withdrawals;

pub use extensions::*;
pub use licenses::*;
pub use orders::*;
pub use partners::*;
pub use withdrawals::*;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, patch, post},
};

use crate::db::AppState;
use crate::middleware::admin_auth;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/licenses", post(create_license))
        .route("/licenses/{code}", get(get_license))
        .route("/licenses/{code}/revoke", post(revoke_license))
        .route("/licenses/{code}/unrevoke", post(unrevoke_license))
        .route("/extensions", get(list_claims))
        .route("/extensions/{claim_number}", patch(decide_claim))
        .route("/partners", post(create_partner).get(list_partners))
        .route("/partners/{id}", get(get_partner))
        .route("/partners/{id}/onboarding", patch(update_onboarding))
        .route("/partners/{id}/deactivate", post(deactivate_partner))
        .route("/partners/{id}/balance", get(get_partner_balance))
        .route("/partners/{id}/withdrawals", get(list_partner_withdrawals))
        .route("/orders", post(create_order))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/refund", patch(update_refund))
        .route("/withdrawals/{id}", patch(decide_withdrawal))
        .route("/withdrawals/{id}/mark-paid", post(mark_paid))
        .route_layer(from_fn_with_state(state, admin_auth))
}
