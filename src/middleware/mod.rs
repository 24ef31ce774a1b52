mod admin_auth;
mod partner_auth;

pub use admin_auth::admin_auth;
pub use partner_auth::{PartnerContext, partner_auth};
