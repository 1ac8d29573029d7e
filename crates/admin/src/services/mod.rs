//! Business logic services for admin.

pub mod auth;

pub use auth::{AdminLoginError, IdentityGate, admin_login};
