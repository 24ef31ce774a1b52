pub mod activation;
pub mod extension;
pub mod validate;

pub use activation::{ActivationInput, ActivationOutcome, DeviceSlotUpsell, activate};
pub use extension::{
    ApprovedExtension, ExtensionOutcome, ExtensionRequest, approve_claim, finalize_due_claims,
    reject_claim, request_extension,
};
pub use validate::{LicenseFault, ValidLicense, Validation, normalize_code, validate_code};
