use serde::{Deserialize, Serialize};

/// A purchased entitlement to read a digital book, identified by a
/// formatted code (`XXXX-XXXX-XXXX-XXXX`) with a capped number of
/// simultaneously active devices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct License {
    pub id: String,
    /// Canonical hyphenated code. Lookups normalize input first.
    pub code: String,
    pub email: String,
    pub customer_name: Option<String>,
    pub is_active: bool,
    pub is_revoked: bool,
    /// Always >= 1. Raised only via the extension workflow.
    pub max_devices: i32,
    pub purchased_at: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateLicense {
    pub email: String,
    #[serde(default)]
    pub customer_name: Option<String>,
    /// Defaults to 2 when omitted.
    #[serde(default)]
    pub max_devices: Option<i32>,
}
