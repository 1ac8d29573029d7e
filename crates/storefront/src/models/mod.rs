//! Domain models for storefront.

pub mod customize;
pub mod session;

pub use customize::CustomizationForm;
pub use session::{CurrentUser, keys as session_keys};
