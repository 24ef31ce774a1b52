//! License extension claims: customer requests to raise a device allowance.
//!
//! The first `AUTO_APPROVE_LIMIT` claims ever made for a license are
//! approved automatically after a randomized delay. The delay is durable:
//! a `scheduled_approval_at` timestamp is persisted at creation and a
//! periodic sweep finalizes whatever is due, so no in-process timer is ever
//! relied upon.

use chrono::Utc;
use rand::Rng;
use rusqlite::{Connection, TransactionBehavior};

use crate::db::queries;
use crate::error::{AppError, Result};
use crate::models::{ClaimStatus, ExtensionClaim};

use super::validate::{LicenseFault, Validation};

/// Claims 1 and 2 for a license auto-approve; claim 3 and later require a
/// human decision.
pub const AUTO_APPROVE_LIMIT: i64 = 2;

pub const MIN_REASON_LEN: usize = 10;

/// Auto-approval delay bounds, seconds.
const MIN_DELAY_SECS: i64 = 120;
const MAX_DELAY_SECS: i64 = 300;

/// Actor recorded on sweep-finalized claims.
pub const SYSTEM_ACTOR: &str = "system";

#[derive(Debug)]
pub struct ExtensionRequest<'a> {
    pub code: &'a str,
    pub email: &'a str,
    pub reason: &'a str,
    pub receipt_info: Option<&'a str>,
}

#[derive(Debug)]
pub enum ExtensionOutcome {
    Created(ExtensionClaim),
    Invalid(LicenseFault),
}

/// File an extension claim. Reason-length validation happens before any
/// state is created.
pub fn request_extension(
    conn: &mut Connection,
    input: &ExtensionRequest<'_>,
) -> Result<ExtensionOutcome> {
    if input.reason.trim().len() < MIN_REASON_LEN {
        return Err(AppError::BadRequest(format!(
            "Reason must be at least {MIN_REASON_LEN} characters"
        )));
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let valid = match super::validate::validate_code(&tx, input.code)? {
        Validation::Valid(v) => v,
        Validation::Invalid(fault) => return Ok(ExtensionOutcome::Invalid(fault)),
    };
    let license = valid.license;

    // Prior claims of any status count toward the auto-approval threshold.
    let prior = queries::count_claims_for_license(&tx, &license.id)?;
    let auto = prior < AUTO_APPROVE_LIMIT;

    let scheduled_approval_at = if auto {
        let delay = rand::thread_rng().gen_range(MIN_DELAY_SECS..=MAX_DELAY_SECS);
        Some(Utc::now().timestamp() + delay)
    } else {
        None
    };

    let claim = queries::create_claim(
        &tx,
        &queries::NewClaim {
            license_id: &license.id,
            email: input.email,
            reason: input.reason,
            receipt_info: input.receipt_info,
            requires_review: !auto,
            scheduled_approval_at,
        },
    )?;
    tx.commit()?;

    tracing::info!(
        claim_number = %claim.claim_number,
        license_id = %claim.license_id,
        requires_review = claim.requires_review,
        "extension claim created"
    );
    Ok(ExtensionOutcome::Created(claim))
}

#[derive(Debug, Clone)]
pub struct ApprovedExtension {
    pub claim_number: String,
    pub new_max_devices: i32,
}

/// Approve a claim, raising the license's allowance by exactly one.
///
/// Idempotent against double approval: a claim that already left PENDING
/// fails with a conflict instead of incrementing the allowance again.
pub fn approve_claim(
    conn: &mut Connection,
    claim_number: &str,
    approved_by: &str,
    auto: bool,
) -> Result<ApprovedExtension> {
    if approved_by.trim().is_empty() {
        return Err(AppError::BadRequest("approved_by is required".into()));
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let claim = queries::get_claim_by_number(&tx, claim_number)?
        .ok_or_else(|| AppError::NotFound("Extension claim not found".into()))?;

    let status = if auto {
        ClaimStatus::AutoApproved
    } else {
        ClaimStatus::Approved
    };
    if !queries::decide_claim(&tx, &claim.id, status, approved_by)? {
        return Err(AppError::Conflict(format!(
            "Claim {claim_number} has already been decided"
        )));
    }

    let new_max_devices = queries::increment_max_devices(&tx, &claim.license_id)?;
    tx.commit()?;

    tracing::info!(
        claim_number,
        approved_by,
        new_max_devices,
        "extension claim approved"
    );
    Ok(ApprovedExtension {
        claim_number: claim_number.to_string(),
        new_max_devices,
    })
}

pub fn reject_claim(
    conn: &mut Connection,
    claim_number: &str,
    rejected_by: &str,
) -> Result<()> {
    if rejected_by.trim().is_empty() {
        return Err(AppError::BadRequest("rejected_by is required".into()));
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let claim = queries::get_claim_by_number(&tx, claim_number)?
        .ok_or_else(|| AppError::NotFound("Extension claim not found".into()))?;
    if !queries::decide_claim(&tx, &claim.id, ClaimStatus::Rejected, rejected_by)? {
        return Err(AppError::Conflict(format!(
            "Claim {claim_number} has already been decided"
        )));
    }
    tx.commit()?;
    Ok(())
}

/// Finalize every pending claim whose scheduled approval time has passed.
/// Called by the periodic sweep and the `sweep` CLI subcommand. Returns
/// the number of claims approved.
pub fn finalize_due_claims(conn: &mut Connection, as_of: i64) -> Result<usize> {
    let due = queries::list_due_claims(conn, as_of)?;
    let mut approved = 0;
    for claim in due {
        match approve_claim(conn, &claim.claim_number, SYSTEM_ACTOR, true) {
            Ok(result) => {
                approved += 1;
                tracing::debug!(
                    claim_number = %result.claim_number,
                    new_max_devices = result.new_max_devices,
                    "auto-approved extension claim"
                );
            }
            // Raced with an admin decision; nothing to do.
            Err(AppError::Conflict(_)) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(approved)
}
