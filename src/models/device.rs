use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DevicePlatform {
    Macos,
    Windows,
    Ios,
    Android,
    Web,
}

/// A binding between a license and a device fingerprint, counted against
/// the license's device cap while active. Unique on (license, fingerprint):
/// re-activating a known fingerprint flips `is_active` back on instead of
/// inserting a second row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceActivation {
    pub id: String,
    pub license_id: String,
    /// Opaque stable identifier supplied by the reader client.
    pub fingerprint: String,
    pub device_name: Option<String>,
    pub platform: DevicePlatform,
    pub is_active: bool,
    pub activated_at: i64,
    pub deactivated_at: Option<i64>,
    // Audit only, never used for enforcement.
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}
