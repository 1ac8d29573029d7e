//! Session-related types.

use serde::{Deserialize, Serialize};

use starterprint_core::{Email, UserId};

/// Session-stored admin identity.
///
/// Only stored after the privilege check passed; holding a `CurrentAdmin`
/// means the user was an admin at login time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Supabase auth user ID.
    pub id: UserId,
    /// Admin's email address.
    pub email: Email,
    /// Supabase access token (JWT).
    pub access_token: String,
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}
