use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params, types::Value};
use strum::IntoEnumIterator;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::*;

use super::from_row::{
    CLAIM_COLS, CLICK_COLS, DEVICE_COLS, LICENSE_COLS, ORDER_COLS, PARTNER_COLS, WITHDRAWAL_COLS,
    query_all, query_one,
};

pub fn now() -> i64 {
    Utc::now().timestamp()
}

fn gen_id() -> String {
    Uuid::new_v4().to_string()
}

/// Alphabet for license codes. Crockford-ish: no 0/O or 1/I lookalikes.
const CODE_ALPHABET: &[u8] = b"23456789ABCDEFGHJKMNPQRSTUVWXYZ";

/// Generate a canonical `XXXX-XXXX-XXXX-XXXX` license code.
fn gen_license_code() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let mut code = String::with_capacity(19);
    for group in 0..4 {
        if group > 0 {
            code.push('-');
        }
        for _ in 0..4 {
            let idx = rng.gen_range(0..CODE_ALPHABET.len());
            code.push(CODE_ALPHABET[idx] as char);
        }
    }
    code
}

/// Builder for dynamic UPDATE statements with optional fields.
/// Combines multiple field updates into a single query.
struct UpdateBuilder {
    table: &'static str,
    id: String,
    fields: Vec<(&'static str, Value)>,
    track_updated_at: bool,
}

impl UpdateBuilder {
    fn new(table: &'static str, id: &str) -> Self {
        Self {
            table,
            id: id.to_string(),
            fields: Vec::new(),
            track_updated_at: false,
        }
    }

    fn with_updated_at(mut self) -> Self {
        self.track_updated_at = true;
        self
    }

    fn set(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.fields.push((column, value.into()));
        self
    }

    fn set_opt<V: Into<Value>>(self, column: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.set(column, v),
            None => self,
        }
    }

    fn execute(mut self, conn: &Connection) -> Result<bool> {
        if self.fields.is_empty() {
            return Ok(false);
        }
        if self.track_updated_at {
            self.fields.push(("updated_at", now().into()));
        }
        let sets: Vec<String> = self
            .fields
            .iter()
            .map(|(col, _)| format!("{} = ?", col))
            .collect();
        let mut values: Vec<Value> = self.fields.into_iter().map(|(_, v)| v).collect();
        values.push(self.id.into());
        let sql = format!("UPDATE {} SET {} WHERE id = ?", self.table, sets.join(", "));
        let affected = conn.execute(&sql, rusqlite::params_from_iter(values))?;
        Ok(affected > 0)
    }
}

// ============ Licenses ============

/// Create a license with a freshly generated code. Retries on the
/// (vanishingly rare) code collision.
pub fn create_license(conn: &Connection, input: &CreateLicense) -> Result<License> {
    let id = gen_id();
    let now = now();
    let max_devices = input.max_devices.unwrap_or(2);
    if max_devices < 1 {
        return Err(AppError::BadRequest("max_devices must be >= 1".into()));
    }

    for _ in 0..8 {
        let code = gen_license_code();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO licenses
                 (id, code, email, customer_name, is_active, is_revoked, max_devices,
                  purchased_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, 1, 0, ?5, ?6, ?6, ?6)",
            params![&id, &code, &input.email, &input.customer_name, max_devices, now],
        )?;
        if inserted > 0 {
            return Ok(License {
                id,
                code,
                email: input.email.clone(),
                customer_name: input.customer_name.clone(),
                is_active: true,
                is_revoked: false,
                max_devices,
                purchased_at: now,
                created_at: now,
                updated_at: now,
            });
        }
    }
    Err(AppError::Internal("could not generate a unique license code".into()))
}

pub fn get_license_by_id(conn: &Connection, id: &str) -> Result<Option<License>> {
    query_one(
        conn,
        &format!("SELECT {} FROM licenses WHERE id = ?1", LICENSE_COLS),
        &[&id],
    )
}

/// Lookup by canonical code. Callers normalize first (see licensing).
pub fn get_license_by_code(conn: &Connection, code: &str) -> Result<Option<License>> {
    query_one(
        conn,
        &format!("SELECT {} FROM licenses WHERE code = ?1", LICENSE_COLS),
        &[&code],
    )
}

pub fn set_license_revoked(conn: &Connection, id: &str, revoked: bool) -> Result<bool> {
    UpdateBuilder::new("licenses", id)
        .with_updated_at()
        .set("is_revoked", revoked)
        .execute(conn)
}

pub fn set_license_active(conn: &Connection, id: &str, active: bool) -> Result<bool> {
    UpdateBuilder::new("licenses", id)
        .with_updated_at()
        .set("is_active", active)
        .execute(conn)
}

/// Raise the device allowance by one. Used only by extension approval.
pub fn increment_max_devices(conn: &Connection, id: &str) -> Result<i32> {
    conn.execute(
        "UPDATE licenses SET max_devices = max_devices + 1, updated_at = ?1 WHERE id = ?2",
        params![now(), id],
    )?;
    let max: i32 = conn.query_row(
        "SELECT max_devices FROM licenses WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    Ok(max)
}

// ============ Device activations ============

pub fn get_activation(
    conn: &Connection,
    license_id: &str,
    fingerprint: &str,
) -> Result<Option<DeviceActivation>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM device_activations WHERE license_id = ?1 AND fingerprint = ?2",
            DEVICE_COLS
        ),
        params![license_id, fingerprint],
    )
}

pub fn count_active_activations(conn: &Connection, license_id: &str) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM device_activations WHERE license_id = ?1 AND is_active = 1",
        params![license_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn list_activations_for_license(
    conn: &Connection,
    license_id: &str,
) -> Result<Vec<DeviceActivation>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM device_activations WHERE license_id = ?1 ORDER BY activated_at",
            DEVICE_COLS
        ),
        params![license_id],
    )
}

pub struct NewActivation<'a> {
    pub license_id: &'a str,
    pub fingerprint: &'a str,
    pub device_name: Option<&'a str>,
    pub platform: DevicePlatform,
    pub ip: Option<&'a str>,
    pub user_agent: Option<&'a str>,
}

pub fn create_activation(conn: &Connection, input: &NewActivation) -> Result<DeviceActivation> {
    let id = gen_id();
    let now = now();
    conn.execute(
        "INSERT INTO device_activations
             (id, license_id, fingerprint, device_name, platform, is_active, activated_at,
              deactivated_at, ip, user_agent)
         VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, NULL, ?7, ?8)",
        params![
            &id,
            input.license_id,
            input.fingerprint,
            input.device_name,
            input.platform.as_ref(),
            now,
            input.ip,
            input.user_agent,
        ],
    )?;
    Ok(DeviceActivation {
        id,
        license_id: input.license_id.to_string(),
        fingerprint: input.fingerprint.to_string(),
        device_name: input.device_name.map(String::from),
        platform: input.platform,
        is_active: true,
        activated_at: now,
        deactivated_at: None,
        ip: input.ip.map(String::from),
        user_agent: input.user_agent.map(String::from),
    })
}

/// Flip an existing binding back on. Never creates a second row for the
/// same fingerprint, and keeps the original activation timestamp for audit.
pub fn reactivate_activation(conn: &Connection, id: &str) -> Result<()> {
    conn.execute(
        "UPDATE device_activations
         SET is_active = 1, deactivated_at = NULL
         WHERE id = ?1",
        params![id],
    )?;
    Ok(())
}

pub fn deactivate_activation(conn: &Connection, id: &str) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE device_activations
         SET is_active = 0, deactivated_at = ?1
         WHERE id = ?2 AND is_active = 1",
        params![now(), id],
    )?;
    Ok(affected > 0)
}

/// Deactivate every active device of a license (admin revocation path).
pub fn deactivate_all_activations(conn: &Connection, license_id: &str) -> Result<usize> {
    let affected = conn.execute(
        "UPDATE device_activations
         SET is_active = 0, deactivated_at = ?1
         WHERE license_id = ?2 AND is_active = 1",
        params![now(), license_id],
    )?;
    Ok(affected)
}

// ============ Extension claims ============

/// Claims ever made for a license, regardless of status. Drives the
/// auto-approval policy.
pub fn count_claims_for_license(conn: &Connection, license_id: &str) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM extension_claims WHERE license_id = ?1",
        params![license_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub struct NewClaim<'a> {
    pub license_id: &'a str,
    pub email: &'a str,
    pub reason: &'a str,
    pub receipt_info: Option<&'a str>,
    pub requires_review: bool,
    pub scheduled_approval_at: Option<i64>,
}

/// Insert a claim with the next sequential claim number. Must run inside
/// an IMMEDIATE transaction so the sequence cannot collide.
pub fn create_claim(conn: &Connection, input: &NewClaim) -> Result<ExtensionClaim> {
    let id = gen_id();
    let now = now();
    let seq: i64 = conn.query_row(
        "SELECT COALESCE(MAX(claim_seq), 0) + 1 FROM extension_claims",
        [],
        |row| row.get(0),
    )?;
    let claim_number = format!("EXT-{:05}", seq);

    conn.execute(
        "INSERT INTO extension_claims
             (id, claim_number, claim_seq, license_id, email, reason, receipt_info, status,
              requires_review, scheduled_approval_at, requested_at, decided_at, decided_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'pending', ?8, ?9, ?10, NULL, NULL)",
        params![
            &id,
            &claim_number,
            seq,
            input.license_id,
            input.email,
            input.reason,
            input.receipt_info,
            input.requires_review,
            input.scheduled_approval_at,
            now,
        ],
    )?;

    Ok(ExtensionClaim {
        id,
        claim_number,
        license_id: input.license_id.to_string(),
        email: input.email.to_string(),
        reason: input.reason.to_string(),
        receipt_info: input.receipt_info.map(String::from),
        status: ClaimStatus::Pending,
        requires_review: input.requires_review,
        scheduled_approval_at: input.scheduled_approval_at,
        requested_at: now,
        decided_at: None,
        decided_by: None,
    })
}

pub fn get_claim_by_number(conn: &Connection, claim_number: &str) -> Result<Option<ExtensionClaim>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM extension_claims WHERE claim_number = ?1",
            CLAIM_COLS
        ),
        &[&claim_number],
    )
}

pub fn list_claims(conn: &Connection, status: Option<ClaimStatus>) -> Result<Vec<ExtensionClaim>> {
    match status {
        Some(status) => query_all(
            conn,
            &format!(
                "SELECT {} FROM extension_claims WHERE status = ?1 ORDER BY requested_at DESC",
                CLAIM_COLS
            ),
            params![status.as_ref()],
        ),
        None => query_all(
            conn,
            &format!(
                "SELECT {} FROM extension_claims ORDER BY requested_at DESC",
                CLAIM_COLS
            ),
            [],
        ),
    }
}

/// Pending claims whose scheduled approval time has passed.
pub fn list_due_claims(conn: &Connection, as_of: i64) -> Result<Vec<ExtensionClaim>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM extension_claims
             WHERE status = 'pending' AND scheduled_approval_at IS NOT NULL
               AND scheduled_approval_at <= ?1
             ORDER BY scheduled_approval_at",
            CLAIM_COLS
        ),
        params![as_of],
    )
}

/// Move a claim out of PENDING. Conditional on the current status, so a
/// second decision attempt affects zero rows - the idempotency guard for
/// double approval.
pub fn decide_claim(
    conn: &Connection,
    claim_id: &str,
    status: ClaimStatus,
    decided_by: &str,
) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE extension_claims
         SET status = ?1, decided_at = ?2, decided_by = ?3
         WHERE id = ?4 AND status = 'pending'",
        params![status.as_ref(), now(), decided_by, claim_id],
    )?;
    Ok(affected > 0)
}

// ============ Partners ============

pub fn create_partner(conn: &Connection, input: &CreatePartner) -> Result<Partner> {
    let id = gen_id();
    let now = now();
    let access_code = Uuid::new_v4().simple().to_string();

    conn.execute(
        "INSERT INTO partners
             (id, slug, name, email, coupon_code, access_code, partner_type,
              commission_percent, click_bounty, discount_percent, country, payout_method,
              stripe_account_id, stripe_onboarding_complete, tax_form_verified,
              last_payout_month, is_active, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                 NULL, 0, 0, NULL, 1, ?13, ?13)",
        params![
            &id,
            &input.slug,
            &input.name,
            &input.email,
            &input.coupon_code,
            &access_code,
            input.partner_type.as_ref(),
            input.commission_percent,
            input.click_bounty,
            input.discount_percent,
            input.country.to_uppercase(),
            input.payout_method.as_ref(),
            now,
        ],
    )?;

    Ok(Partner {
        id,
        slug: input.slug.clone(),
        name: input.name.clone(),
        email: input.email.clone(),
        coupon_code: input.coupon_code.clone(),
        access_code,
        partner_type: input.partner_type,
        commission_percent: input.commission_percent,
        click_bounty: input.click_bounty,
        discount_percent: input.discount_percent,
        country: input.country.to_uppercase(),
        payout_method: input.payout_method,
        stripe_account_id: None,
        stripe_onboarding_complete: false,
        tax_form_verified: false,
        last_payout_month: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    })
}

pub fn get_partner_by_id(conn: &Connection, id: &str) -> Result<Option<Partner>> {
    query_one(
        conn,
        &format!("SELECT {} FROM partners WHERE id = ?1", PARTNER_COLS),
        &[&id],
    )
}

pub fn get_partner_by_slug(conn: &Connection, slug: &str) -> Result<Option<Partner>> {
    query_one(
        conn,
        &format!("SELECT {} FROM partners WHERE slug = ?1", PARTNER_COLS),
        &[&slug],
    )
}

pub fn get_partner_by_access_code(conn: &Connection, access_code: &str) -> Result<Option<Partner>> {
    query_one(
        conn,
        &format!("SELECT {} FROM partners WHERE access_code = ?1", PARTNER_COLS),
        &[&access_code],
    )
}

pub fn list_partners(conn: &Connection) -> Result<Vec<Partner>> {
    query_all(
        conn,
        &format!("SELECT {} FROM partners ORDER BY created_at DESC", PARTNER_COLS),
        [],
    )
}

pub fn update_partner_onboarding(
    conn: &Connection,
    id: &str,
    input: &UpdatePartnerOnboarding,
) -> Result<bool> {
    UpdateBuilder::new("partners", id)
        .with_updated_at()
        .set_opt("tax_form_verified", input.tax_form_verified)
        .set_opt(
            "stripe_onboarding_complete",
            input.stripe_onboarding_complete,
        )
        .set_opt("stripe_account_id", input.stripe_account_id.clone())
        .execute(conn)
}

/// Admin override: deactivation ignores every other invariant.
pub fn set_partner_active(conn: &Connection, id: &str, active: bool) -> Result<bool> {
    UpdateBuilder::new("partners", id)
        .with_updated_at()
        .set("is_active", active)
        .execute(conn)
}

pub fn set_last_payout_month(conn: &Connection, id: &str, month: &str) -> Result<bool> {
    UpdateBuilder::new("partners", id)
        .with_updated_at()
        .set("last_payout_month", month.to_string())
        .execute(conn)
}

// ============ Orders ============

pub fn create_order(conn: &Connection, input: &CreateOrder) -> Result<Order> {
    let id = gen_id();
    let now = now();
    let matures_at = now + MATURITY_DAYS * SECONDS_PER_DAY;

    conn.execute(
        "INSERT INTO orders
             (id, partner_id, amount, commission, status, refund_status, created_at, matures_at)
         VALUES (?1, ?2, ?3, ?4, 'completed', 'none', ?5, ?6)",
        params![&id, &input.partner_id, input.amount, input.commission, now, matures_at],
    )?;

    Ok(Order {
        id,
        partner_id: input.partner_id.clone(),
        amount: input.amount,
        commission: input.commission,
        status: OrderStatus::Completed,
        refund_status: RefundStatus::None,
        created_at: now,
        matures_at,
    })
}

pub fn get_order_by_id(conn: &Connection, id: &str) -> Result<Option<Order>> {
    query_one(
        conn,
        &format!("SELECT {} FROM orders WHERE id = ?1", ORDER_COLS),
        &[&id],
    )
}

pub fn update_order_refund(
    conn: &Connection,
    id: &str,
    refund_status: RefundStatus,
    order_status: OrderStatus,
) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE orders SET refund_status = ?1, status = ?2 WHERE id = ?3",
        params![refund_status.as_ref(), order_status.as_ref(), id],
    )?;
    Ok(affected > 0)
}

/// Commission from completed, non-refunded orders whose maturity window
/// has passed.
pub fn sum_matured_commission(conn: &Connection, partner_id: &str, as_of: i64) -> Result<f64> {
    let sum: Option<f64> = conn
        .query_row(
            "SELECT SUM(commission) FROM orders
             WHERE partner_id = ?1
               AND status = 'completed'
               AND refund_status != 'approved'
               AND matures_at <= ?2",
            params![partner_id, as_of],
            |row| row.get(0),
        )
        .optional()?
        .flatten();
    Ok(sum.unwrap_or(0.0))
}

// ============ Click events ============

pub fn record_click(
    conn: &Connection,
    partner_id: &str,
    kind: ClickKind,
    ip: Option<&str>,
    user_agent: Option<&str>,
) -> Result<ClickEvent> {
    let id = gen_id();
    let now = now();
    conn.execute(
        "INSERT INTO click_events (id, partner_id, kind, ip, user_agent, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![&id, partner_id, kind.as_ref(), ip, user_agent, now],
    )?;
    Ok(ClickEvent {
        id,
        partner_id: partner_id.to_string(),
        kind,
        ip: ip.map(String::from),
        user_agent: user_agent.map(String::from),
        created_at: now,
    })
}

/// Retailer clicks that earn the click bounty. No maturity delay. The
/// qualifying kinds come from `ClickKind::earns_bounty`, so the SQL filter
/// cannot drift from the enum.
pub fn count_bounty_clicks(conn: &Connection, partner_id: &str) -> Result<i64> {
    let kinds: Vec<String> = ClickKind::iter()
        .filter(|k| k.earns_bounty())
        .map(|k| format!("'{}'", k.as_ref()))
        .collect();
    let count = conn.query_row(
        &format!(
            "SELECT COUNT(*) FROM click_events WHERE partner_id = ?1 AND kind IN ({})",
            kinds.join(", ")
        ),
        params![partner_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn list_clicks_for_partner(conn: &Connection, partner_id: &str) -> Result<Vec<ClickEvent>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM click_events WHERE partner_id = ?1 ORDER BY created_at DESC",
            CLICK_COLS
        ),
        params![partner_id],
    )
}

// ============ Withdrawal requests ============

pub struct NewWithdrawal<'a> {
    pub partner_id: &'a str,
    pub amount_requested: f64,
    pub payout_fee: f64,
    pub monthly_fee: f64,
    pub cross_border_fee: f64,
    pub total_fees: f64,
    pub amount_to_deposit: f64,
    pub payout_method: PayoutMethod,
}

pub fn create_withdrawal(conn: &Connection, input: &NewWithdrawal) -> Result<WithdrawalRequest> {
    let id = gen_id();
    let now = now();
    conn.execute(
        "INSERT INTO withdrawal_requests
             (id, partner_id, amount_requested, payout_fee, monthly_fee, cross_border_fee,
              total_fees, amount_to_deposit, status, payout_method, requested_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 'pending', ?9, ?10)",
        params![
            &id,
            input.partner_id,
            input.amount_requested,
            input.payout_fee,
            input.monthly_fee,
            input.cross_border_fee,
            input.total_fees,
            input.amount_to_deposit,
            input.payout_method.as_ref(),
            now,
        ],
    )?;
    Ok(WithdrawalRequest {
        id,
        partner_id: input.partner_id.to_string(),
        amount_requested: input.amount_requested,
        payout_fee: input.payout_fee,
        monthly_fee: input.monthly_fee,
        cross_border_fee: input.cross_border_fee,
        total_fees: input.total_fees,
        amount_to_deposit: input.amount_to_deposit,
        status: WithdrawalStatus::Pending,
        payout_method: input.payout_method,
        requested_at: now,
        decided_at: None,
        decided_by: None,
        paid_at: None,
        transfer_id: None,
        failure_reason: None,
    })
}

pub fn get_withdrawal_by_id(conn: &Connection, id: &str) -> Result<Option<WithdrawalRequest>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM withdrawal_requests WHERE id = ?1",
            WITHDRAWAL_COLS
        ),
        &[&id],
    )
}

pub fn list_withdrawals_for_partner(
    conn: &Connection,
    partner_id: &str,
) -> Result<Vec<WithdrawalRequest>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM withdrawal_requests WHERE partner_id = ?1 ORDER BY requested_at DESC",
            WITHDRAWAL_COLS
        ),
        params![partner_id],
    )
}

/// Whether a request admitted in `month` (`YYYY-MM`) already carries the
/// monthly active fee. Rejected and failed requests never deposited, so
/// they do not count as a charge.
pub fn monthly_fee_already_charged(
    conn: &Connection,
    partner_id: &str,
    month: &str,
) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM withdrawal_requests
         WHERE partner_id = ?1
           AND monthly_fee > 0
           AND status IN ('pending', 'approved', 'paid')
           AND strftime('%Y-%m', requested_at, 'unixepoch') = ?2",
        params![partner_id, month],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Amounts already spoken for: requests sitting in PENDING or APPROVED
/// are reserved against the partner's available balance.
pub fn sum_reserved_withdrawals(conn: &Connection, partner_id: &str) -> Result<f64> {
    let sum: Option<f64> = conn
        .query_row(
            "SELECT SUM(amount_requested) FROM withdrawal_requests
             WHERE partner_id = ?1 AND status IN ('pending', 'approved')",
            params![partner_id],
            |row| row.get(0),
        )
        .optional()?
        .flatten();
    Ok(sum.unwrap_or(0.0))
}

/// PENDING -> APPROVED. Conditional, so a double approval affects zero rows.
pub fn approve_withdrawal(conn: &Connection, id: &str, decided_by: &str) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE withdrawal_requests
         SET status = 'approved', decided_at = ?1, decided_by = ?2
         WHERE id = ?3 AND status = 'pending'",
        params![now(), decided_by, id],
    )?;
    Ok(affected > 0)
}

pub fn reject_withdrawal(conn: &Connection, id: &str, decided_by: &str) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE withdrawal_requests
         SET status = 'rejected', decided_at = ?1, decided_by = ?2
         WHERE id = ?3 AND status = 'pending'",
        params![now(), decided_by, id],
    )?;
    Ok(affected > 0)
}

/// APPROVED -> PAID with the provider's transfer id.
pub fn mark_withdrawal_paid(conn: &Connection, id: &str, transfer_id: &str) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE withdrawal_requests
         SET status = 'paid', paid_at = ?1, transfer_id = ?2
         WHERE id = ?3 AND status = 'approved'",
        params![now(), transfer_id, id],
    )?;
    Ok(affected > 0)
}

/// APPROVED -> FAILED. The fee breakdown is left untouched.
pub fn mark_withdrawal_failed(conn: &Connection, id: &str, reason: &str) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE withdrawal_requests
         SET status = 'failed', failure_reason = ?1
         WHERE id = ?2 AND status = 'approved'",
        params![reason, id],
    )?;
    Ok(affected > 0)
}
