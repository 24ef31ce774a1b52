//! License validation: code normalization plus the existence -> revoked ->
//! inactive check order. Read-only.

use rusqlite::Connection;
use serde::Serialize;

use crate::db::queries;
use crate::error::Result;
use crate::models::License;

/// Normalize user input to the canonical `XXXX-XXXX-XXXX-XXXX` form:
/// strip everything non-alphanumeric, uppercase, re-hyphenate every four
/// characters. Visually-equivalent inputs resolve to the same code.
pub fn normalize_code(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    let mut canonical = String::with_capacity(cleaned.len() + cleaned.len() / 4);
    for (i, c) in cleaned.chars().enumerate() {
        if i > 0 && i % 4 == 0 {
            canonical.push('-');
        }
        canonical.push(c);
    }
    canonical
}

/// Why a license is not usable. First match wins: existence, then
/// revocation, then the active flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LicenseFault {
    NotFound,
    Revoked,
    Inactive,
}

impl LicenseFault {
    pub fn error_code(self) -> &'static str {
        match self {
            LicenseFault::NotFound => "NOT_FOUND",
            LicenseFault::Revoked => "REVOKED",
            LicenseFault::Inactive => "INACTIVE",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            LicenseFault::NotFound => "No license matches this code",
            LicenseFault::Revoked => "This license has been revoked",
            LicenseFault::Inactive => "This license is no longer active",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidLicense {
    pub license: License,
    pub active_devices: i64,
}

#[derive(Debug, Clone)]
pub enum Validation {
    Valid(ValidLicense),
    Invalid(LicenseFault),
}

/// Resolve a raw code to a usable license, or the first failing fault.
pub fn validate_code(conn: &Connection, raw_code: &str) -> Result<Validation> {
    let code = normalize_code(raw_code);

    let Some(license) = queries::get_license_by_code(conn, &code)? else {
        return Ok(Validation::Invalid(LicenseFault::NotFound));
    };
    if license.is_revoked {
        return Ok(Validation::Invalid(LicenseFault::Revoked));
    }
    if !license.is_active {
        return Ok(Validation::Invalid(LicenseFault::Inactive));
    }

    let active_devices = queries::count_active_activations(conn, &license.id)?;
    Ok(Validation::Valid(ValidLicense {
        license,
        active_devices,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_is_canonical() {
        assert_eq!(normalize_code("abcd-EFGH-1234-wxyz"), "ABCD-EFGH-1234-WXYZ");
        assert_eq!(normalize_code("ABCDEFGH1234WXYZ"), "ABCD-EFGH-1234-WXYZ");
        assert_eq!(normalize_code("ABCD-EFGH-1234-WXYZ"), "ABCD-EFGH-1234-WXYZ");
        assert_eq!(normalize_code(" ab cd / ef-gh "), "ABCD-EFGH");
    }

    #[test]
    fn normalization_drops_unicode_noise() {
        assert_eq!(normalize_code("ab\u{2013}cd"), "ABCD");
        assert_eq!(normalize_code(""), "");
    }
}
