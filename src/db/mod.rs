mod from_row;
pub mod queries;

pub use from_row::FromRow;

use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::email::EmailSender;
use crate::error::Result;
use crate::payments::StripeTransfers;

pub type DbPool = r2d2::Pool<SqliteConnectionManager>;

/// Process-wide state, constructed once at startup and injected into every
/// handler. All mutable state lives in the store; the application layer is
/// stateless between requests.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub base_url: String,
    pub admin_token: Option<String>,
    pub email: EmailSender,
    pub transfers: StripeTransfers,
}

pub fn open_pool(path: &str) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(path).with_init(|conn| {
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA foreign_keys = ON;")
    });
    Ok(r2d2::Pool::builder().build(manager)?)
}

/// Create the schema. Idempotent.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS licenses (
            id            TEXT PRIMARY KEY,
            code          TEXT NOT NULL UNIQUE,
            email         TEXT NOT NULL,
            customer_name TEXT,
            is_active     INTEGER NOT NULL DEFAULT 1,
            is_revoked    INTEGER NOT NULL DEFAULT 0,
            max_devices   INTEGER NOT NULL DEFAULT 2 CHECK (max_devices >= 1),
            purchased_at  INTEGER NOT NULL,
            created_at    INTEGER NOT NULL,
            updated_at    INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS device_activations (
            id             TEXT PRIMARY KEY,
            license_id     TEXT NOT NULL REFERENCES licenses(id),
            fingerprint    TEXT NOT NULL,
            device_name    TEXT,
            platform       TEXT NOT NULL,
            is_active      INTEGER NOT NULL DEFAULT 1,
            activated_at   INTEGER NOT NULL,
            deactivated_at INTEGER,
            ip             TEXT,
            user_agent     TEXT,
            UNIQUE (license_id, fingerprint)
        );
        CREATE INDEX IF NOT EXISTS idx_activations_license
            ON device_activations (license_id, is_active);

        CREATE TABLE IF NOT EXISTS extension_claims (
            id                    TEXT PRIMARY KEY,
            claim_number          TEXT NOT NULL UNIQUE,
            claim_seq             INTEGER NOT NULL UNIQUE,
            license_id            TEXT NOT NULL REFERENCES licenses(id),
            email                 TEXT NOT NULL,
            reason                TEXT NOT NULL,
            receipt_info          TEXT,
            status                TEXT NOT NULL DEFAULT 'pending',
            requires_review       INTEGER NOT NULL DEFAULT 0,
            scheduled_approval_at INTEGER,
            requested_at          INTEGER NOT NULL,
            decided_at            INTEGER,
            decided_by            TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_claims_license
            ON extension_claims (license_id);
        CREATE INDEX IF NOT EXISTS idx_claims_due
            ON extension_claims (status, scheduled_approval_at);

        CREATE TABLE IF NOT EXISTS partners (
            id                         TEXT PRIMARY KEY,
            slug                       TEXT NOT NULL UNIQUE,
            name                       TEXT NOT NULL,
            email                      TEXT NOT NULL,
            coupon_code                TEXT NOT NULL UNIQUE,
            access_code                TEXT NOT NULL UNIQUE,
            partner_type               TEXT NOT NULL,
            commission_percent         REAL NOT NULL DEFAULT 0,
            click_bounty               REAL NOT NULL DEFAULT 0,
            discount_percent           REAL NOT NULL DEFAULT 0,
            country                    TEXT NOT NULL,
            payout_method              TEXT NOT NULL,
            stripe_account_id          TEXT,
            stripe_onboarding_complete INTEGER NOT NULL DEFAULT 0,
            tax_form_verified          INTEGER NOT NULL DEFAULT 0,
            last_payout_month          TEXT,
            is_active                  INTEGER NOT NULL DEFAULT 1,
            created_at                 INTEGER NOT NULL,
            updated_at                 INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS orders (
            id            TEXT PRIMARY KEY,
            partner_id    TEXT REFERENCES partners(id),
            amount        REAL NOT NULL,
            commission    REAL NOT NULL DEFAULT 0,
            status        TEXT NOT NULL DEFAULT 'completed',
            refund_status TEXT NOT NULL DEFAULT 'none',
            created_at    INTEGER NOT NULL,
            matures_at    INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_orders_partner
            ON orders (partner_id, status);

        CREATE TABLE IF NOT EXISTS click_events (
            id         TEXT PRIMARY KEY,
            partner_id TEXT NOT NULL REFERENCES partners(id),
            kind       TEXT NOT NULL,
            ip         TEXT,
            user_agent TEXT,
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_clicks_partner
            ON click_events (partner_id, kind);

        CREATE TABLE IF NOT EXISTS withdrawal_requests (
            id                TEXT PRIMARY KEY,
            partner_id        TEXT NOT NULL REFERENCES partners(id),
            amount_requested  REAL NOT NULL,
            payout_fee        REAL NOT NULL,
            monthly_fee       REAL NOT NULL,
            cross_border_fee  REAL NOT NULL,
            total_fees        REAL NOT NULL,
            amount_to_deposit REAL NOT NULL,
            status            TEXT NOT NULL DEFAULT 'pending',
            payout_method     TEXT NOT NULL,
            requested_at      INTEGER NOT NULL,
            decided_at        INTEGER,
            decided_by        TEXT,
            paid_at           INTEGER,
            transfer_id       TEXT,
            failure_reason    TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_withdrawals_partner
            ON withdrawal_requests (partner_id, status);",
    )?;
    Ok(())
}
