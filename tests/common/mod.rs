//! Shared helpers for integration tests: an in-memory application plus
//! seed-data constructors.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, params};
use serde_json::Value;
use tower::ServiceExt;

use bindery::db::{AppState, DbPool, init_db, queries};
use bindery::email::EmailSender;
use bindery::models::{
    CreateLicense, CreateOrder, CreatePartner, License, Partner, PartnerType, PayoutMethod,
    UpdatePartnerOnboarding,
};
use bindery::payments::StripeTransfers;

pub const ADMIN_TOKEN: &str = "test-admin-token";

/// In-memory SQLite gives every pooled connection its own database, so the
/// pool is capped at one connection.
pub fn test_pool() -> DbPool {
    let manager = SqliteConnectionManager::memory();
    let pool = Pool::builder().max_size(1).build(manager).unwrap();
    {
        let conn = pool.get().unwrap();
        init_db(&conn).unwrap();
    }
    pool
}

pub fn test_state(pool: DbPool) -> AppState {
    AppState {
        db: pool,
        base_url: "http://localhost:3000".to_string(),
        admin_token: Some(ADMIN_TOKEN.to_string()),
        email: EmailSender::new(None, "Bindery <noreply@test.invalid>".to_string()),
        transfers: StripeTransfers::new(None),
    }
}

pub fn test_app(pool: DbPool) -> Router {
    bindery::handlers::app(test_state(pool))
}

// ============ Seed data ============

pub fn create_test_license(conn: &Connection, max_devices: i32) -> License {
    queries::create_license(
        conn,
        &CreateLicense {
            email: "reader@example.com".to_string(),
            customer_name: Some("Test Reader".to_string()),
            max_devices: Some(max_devices),
        },
    )
    .unwrap()
}

pub fn create_test_partner(conn: &Connection, slug: &str, country: &str) -> Partner {
    queries::create_partner(
        conn,
        &CreatePartner {
            slug: slug.to_string(),
            name: format!("Partner {slug}"),
            email: format!("{slug}@example.com"),
            coupon_code: format!("SAVE-{}", slug.to_uppercase()),
            partner_type: PartnerType::RevShare,
            commission_percent: 20.0,
            click_bounty: 0.10,
            discount_percent: 10.0,
            country: country.to_string(),
            payout_method: PayoutMethod::StripeConnect,
        },
    )
    .unwrap()
}

pub fn create_flat_fee_partner(conn: &Connection, slug: &str) -> Partner {
    queries::create_partner(
        conn,
        &CreatePartner {
            slug: slug.to_string(),
            name: format!("Partner {slug}"),
            email: format!("{slug}@example.com"),
            coupon_code: format!("SAVE-{}", slug.to_uppercase()),
            partner_type: PartnerType::FlatFee,
            commission_percent: 0.0,
            click_bounty: 0.0,
            discount_percent: 10.0,
            country: "US".to_string(),
            payout_method: PayoutMethod::BankTransfer,
        },
    )
    .unwrap()
}

/// Mark the partner fully onboarded: verified tax form, completed Stripe
/// onboarding, account id on file.
pub fn complete_onboarding(conn: &Connection, partner_id: &str) {
    queries::update_partner_onboarding(
        conn,
        partner_id,
        &UpdatePartnerOnboarding {
            tax_form_verified: Some(true),
            stripe_onboarding_complete: Some(true),
            stripe_account_id: Some("acct_test123".to_string()),
        },
    )
    .unwrap();
}

/// Record a completed order and backdate it so its commission has already
/// matured.
pub fn create_matured_order(conn: &Connection, partner_id: &str, commission: f64) {
    let order = queries::create_order(
        conn,
        &CreateOrder {
            partner_id: Some(partner_id.to_string()),
            amount: commission * 5.0,
            commission,
        },
    )
    .unwrap();
    conn.execute(
        "UPDATE orders SET matures_at = ?1, created_at = ?2 WHERE id = ?3",
        params![queries::now() - 60, queries::now() - 17 * 86400, &order.id],
    )
    .unwrap();
}

/// Record a completed order still inside the maturity window.
pub fn create_unmatured_order(conn: &Connection, partner_id: &str, commission: f64) {
    queries::create_order(
        conn,
        &CreateOrder {
            partner_id: Some(partner_id.to_string()),
            amount: commission * 5.0,
            commission,
        },
    )
    .unwrap();
}

// ============ Request helpers ============

pub async fn send_json(
    app: Router,
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: Value,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    app.oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

pub async fn send_get(app: Router, uri: &str, bearer: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    app.oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).expect("Response should be valid JSON")
}
