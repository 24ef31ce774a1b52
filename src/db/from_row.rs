//! Row-mapping helpers: one `FromRow` impl and one column list per entity,
//! plus the generic `query_one`/`query_all` used by `queries`.
//!
//! The column lists must stay in the same order as the `FromRow` impls
//! read them.

use std::str::FromStr;

use rusqlite::types::Type;
use rusqlite::{Connection, Params, Row};

use crate::error::Result;
use crate::models::*;

pub trait FromRow: Sized {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

pub fn query_one<T: FromRow, P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Option<T>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query_map(params, |row| T::from_row(row))?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

pub fn query_all<T: FromRow, P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, |row| T::from_row(row))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Parse a TEXT column into a strum-backed enum.
fn parse_enum<T>(idx: usize, value: String) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub const LICENSE_COLS: &str =
    "id, code, email, customer_name, is_active, is_revoked, max_devices, purchased_at, \
     created_at, updated_at";

impl FromRow for License {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(License {
            id: row.get(0)?,
            code: row.get(1)?,
            email: row.get(2)?,
            customer_name: row.get(3)?,
            is_active: row.get(4)?,
            is_revoked: row.get(5)?,
            max_devices: row.get(6)?,
            purchased_at: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }
}

pub const DEVICE_COLS: &str =
    "id, license_id, fingerprint, device_name, platform, is_active, activated_at, \
     deactivated_at, ip, user_agent";

impl FromRow for DeviceActivation {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(DeviceActivation {
            id: row.get(0)?,
            license_id: row.get(1)?,
            fingerprint: row.get(2)?,
            device_name: row.get(3)?,
            platform: parse_enum(4, row.get::<_, String>(4)?)?,
            is_active: row.get(5)?,
            activated_at: row.get(6)?,
            deactivated_at: row.get(7)?,
            ip: row.get(8)?,
            user_agent: row.get(9)?,
        })
    }
}

pub const CLAIM_COLS: &str =
    "id, claim_number, license_id, email, reason, receipt_info, status, requires_review, \
     scheduled_approval_at, requested_at, decided_at, decided_by";

impl FromRow for ExtensionClaim {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ExtensionClaim {
            id: row.get(0)?,
            claim_number: row.get(1)?,
            license_id: row.get(2)?,
            email: row.get(3)?,
            reason: row.get(4)?,
            receipt_info: row.get(5)?,
            status: parse_enum(6, row.get::<_, String>(6)?)?,
            requires_review: row.get(7)?,
            scheduled_approval_at: row.get(8)?,
            requested_at: row.get(9)?,
            decided_at: row.get(10)?,
            decided_by: row.get(11)?,
        })
    }
}

pub const PARTNER_COLS: &str =
    "id, slug, name, email, coupon_code, access_code, partner_type, commission_percent, \
     click_bounty, discount_percent, country, payout_method, stripe_account_id, \
     stripe_onboarding_complete, tax_form_verified, last_payout_month, is_active, \
     created_at, updated_at";

impl FromRow for Partner {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Partner {
            id: row.get(0)?,
            slug: row.get(1)?,
            name: row.get(2)?,
            email: row.get(3)?,
            coupon_code: row.get(4)?,
            access_code: row.get(5)?,
            partner_type: parse_enum(6, row.get::<_, String>(6)?)?,
            commission_percent: row.get(7)?,
            click_bounty: row.get(8)?,
            discount_percent: row.get(9)?,
            country: row.get(10)?,
            payout_method: parse_enum(11, row.get::<_, String>(11)?)?,
            stripe_account_id: row.get(12)?,
            stripe_onboarding_complete: row.get(13)?,
            tax_form_verified: row.get(14)?,
            last_payout_month: row.get(15)?,
            is_active: row.get(16)?,
            created_at: row.get(17)?,
            updated_at: row.get(18)?,
        })
    }
}

pub const ORDER_COLS: &str =
    "id, partner_id, amount, commission, status, refund_status, created_at, matures_at";

impl FromRow for Order {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Order {
            id: row.get(0)?,
            partner_id: row.get(1)?,
            amount: row.get(2)?,
            commission: row.get(3)?,
            status: parse_enum(4, row.get::<_, String>(4)?)?,
            refund_status: parse_enum(5, row.get::<_, String>(5)?)?,
            created_at: row.get(6)?,
            matures_at: row.get(7)?,
        })
    }
}

pub const WITHDRAWAL_COLS: &str =
    "id, partner_id, amount_requested, payout_fee, monthly_fee, cross_border_fee, total_fees, \
     amount_to_deposit, status, payout_method, requested_at, decided_at, decided_by, paid_at, \
     transfer_id, failure_reason";

impl FromRow for WithdrawalRequest {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(WithdrawalRequest {
            id: row.get(0)?,
            partner_id: row.get(1)?,
            amount_requested: row.get(2)?,
            payout_fee: row.get(3)?,
            monthly_fee: row.get(4)?,
            cross_border_fee: row.get(5)?,
            total_fees: row.get(6)?,
            amount_to_deposit: row.get(7)?,
            status: parse_enum(8, row.get::<_, String>(8)?)?,
            payout_method: parse_enum(9, row.get::<_, String>(9)?)?,
            requested_at: row.get(10)?,
            decided_at: row.get(11)?,
            decided_by: row.get(12)?,
            paid_at: row.get(13)?,
            transfer_id: row.get(14)?,
            failure_reason: row.get(15)?,
        })
    }
}

pub const CLICK_COLS: &str = "id, partner_id, kind, ip, user_agent, created_at";

impl FromRow for ClickEvent {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ClickEvent {
            id: row.get(0)?,
            partner_id: row.get(1)?,
            kind: parse_enum(2, row.get::<_, String>(2)?)?,
            ip: row.get(3)?,
            user_agent: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}
