//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use starterprint_core::{Email, UserId};

/// Session-stored user identity.
///
/// Carries the Supabase access and refresh tokens so handlers can make
/// authenticated PostgREST / Storage calls on the user's behalf.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Supabase auth user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Supabase access token (JWT).
    pub access_token: String,
    /// Supabase refresh token.
    pub refresh_token: String,
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the serialized cart payload.
    pub const CART: &str = "cart";

    /// Key for the in-progress customization form.
    pub const CUSTOMIZE_FORM: &str = "customize_form";
}
