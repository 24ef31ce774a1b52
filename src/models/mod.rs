mod device;
mod extension;
mod license;
mod order;
mod partner;
mod withdrawal;

pub use device::*;
pub use extension::*;
pub use license::*;
pub use order::*;
pub use partner::*;
pub use withdrawal::*;
