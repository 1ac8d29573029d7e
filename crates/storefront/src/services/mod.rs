//! Business services for storefront.

pub mod checkout;

pub use checkout::{CheckoutError, start_checkout};
