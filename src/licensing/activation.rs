//! Device activation: enforces the at-most-N-active-devices invariant.
//!
//! The count-then-insert sequence runs inside an IMMEDIATE transaction so
//! two concurrent activations against a license at its cap cannot both be
//! admitted.

use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;

use crate::db::queries;
use crate::error::Result;
use crate::models::{DeviceActivation, DevicePlatform};

use super::validate::{LicenseFault, Validation, normalize_code};

/// Price of one additional device slot, offered when the cap is hit.
pub const EXTRA_DEVICE_PRICE_USD: f64 = 5.99;

#[derive(Debug)]
pub struct ActivationInput<'a> {
    pub code: &'a str,
    pub fingerprint: &'a str,
    pub device_name: Option<&'a str>,
    pub platform: DevicePlatform,
    pub ip: Option<&'a str>,
    pub user_agent: Option<&'a str>,
}

/// Upsell metadata attached to a `DEVICE_LIMIT_EXCEEDED` failure.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceSlotUpsell {
    pub available: bool,
    pub price: f64,
    pub currency: &'static str,
    pub description: String,
    pub checkout_url: String,
}

#[derive(Debug)]
pub enum ActivationOutcome {
    Activated {
        activation: DeviceActivation,
        remaining_activations: i64,
        reactivated: bool,
    },
    LimitExceeded {
        max_devices: i32,
        support_claim_url: String,
        upsell: DeviceSlotUpsell,
    },
    Invalid(LicenseFault),
}

/// Activate a device fingerprint against a license.
///
/// A fingerprint already bound to the license is reactivated in place and
/// never counts against the cap a second time, even when the license is
/// otherwise full.
pub fn activate(
    conn: &mut Connection,
    base_url: &str,
    input: &ActivationInput<'_>,
) -> Result<ActivationOutcome> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let valid = match super::validate::validate_code(&tx, input.code)? {
        Validation::Valid(v) => v,
        Validation::Invalid(fault) => return Ok(ActivationOutcome::Invalid(fault)),
    };
    let license = valid.license;

    if let Some(existing) = queries::get_activation(&tx, &license.id, input.fingerprint)? {
        let reactivated = !existing.is_active;
        if reactivated {
            queries::reactivate_activation(&tx, &existing.id)?;
        }
        let active = queries::count_active_activations(&tx, &license.id)?;
        let activation = queries::get_activation(&tx, &license.id, input.fingerprint)?
            .unwrap_or(existing);
        tx.commit()?;
        return Ok(ActivationOutcome::Activated {
            activation,
            remaining_activations: i64::from(license.max_devices) - active,
            reactivated,
        });
    }

    let active = queries::count_active_activations(&tx, &license.id)?;
    if active >= i64::from(license.max_devices) {
        // No state change; the transaction only held the lock for the check.
        drop(tx);
        let code = normalize_code(input.code);
        let encoded = urlencoding::encode(&code).into_owned();
        return Ok(ActivationOutcome::LimitExceeded {
            max_devices: license.max_devices,
            support_claim_url: format!("{base_url}/support/extension-claim?code={encoded}"),
            upsell: DeviceSlotUpsell {
                available: true,
                price: EXTRA_DEVICE_PRICE_USD,
                currency: "USD",
                description: "Add one additional device slot to your license".to_string(),
                checkout_url: format!("{base_url}/checkout/device-slot?code={encoded}"),
            },
        });
    }

    let activation = queries::create_activation(
        &tx,
        &queries::NewActivation {
            license_id: &license.id,
            fingerprint: input.fingerprint,
            device_name: input.device_name,
            platform: input.platform,
            ip: input.ip,
            user_agent: input.user_agent,
        },
    )?;
    tx.commit()?;

    Ok(ActivationOutcome::Activated {
        remaining_activations: i64::from(license.max_devices) - (active + 1),
        activation,
        reactivated: false,
    })
}

#[derive(Debug, Clone, Copy)]
pub struct Deactivation {
    /// False when the binding was already inactive.
    pub deactivated: bool,
    pub remaining_devices: i64,
}

/// Explicit device-management deactivation. Frees a slot for the license.
/// Returns None when the license or binding does not exist.
pub fn deactivate(
    conn: &mut Connection,
    code: &str,
    fingerprint: &str,
) -> Result<Option<Deactivation>> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let canonical = normalize_code(code);
    let Some(license) = queries::get_license_by_code(&tx, &canonical)? else {
        return Ok(None);
    };
    let Some(activation) = queries::get_activation(&tx, &license.id, fingerprint)? else {
        return Ok(None);
    };

    let deactivated = queries::deactivate_activation(&tx, &activation.id)?;
    let remaining_devices = queries::count_active_activations(&tx, &license.id)?;
    tx.commit()?;
    Ok(Some(Deactivation {
        deactivated,
        remaining_devices,
    }))
}
