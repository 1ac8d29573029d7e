//! Admin login gate.
//!
//! Logging in to the admin panel is a two-step check: authenticate against
//! GoTrue, then ask the database whether that user is an admin. A user who
//! authenticates but fails the privilege check is signed out again so their
//! fresh token cannot be reused, and the login fails.

use thiserror::Error;
use tracing::instrument;

use crate::models::CurrentAdmin;
use crate::supabase::{AuthSession, SupabaseClient, SupabaseError};

/// Errors surfaced on the admin login form.
#[derive(Debug, Error)]
pub enum AdminLoginError {
    #[error("Email ou mot de passe incorrect")]
    InvalidCredentials,
    #[error("Accès non autorisé")]
    NotAuthorized,
    #[error("Une erreur est survenue. Veuillez réessayer.")]
    Api(#[source] SupabaseError),
}

/// The identity calls the login gate needs, abstracted for testing.
pub trait IdentityGate {
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<AuthSession, SupabaseError>> + Send;

    fn is_admin(
        &self,
        access_token: &str,
    ) -> impl Future<Output = Result<bool, SupabaseError>> + Send;

    fn sign_out(
        &self,
        access_token: &str,
    ) -> impl Future<Output = Result<(), SupabaseError>> + Send;
}

impl IdentityGate for SupabaseClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, SupabaseError> {
        Self::sign_in(self, email, password).await
    }

    async fn is_admin(&self, access_token: &str) -> Result<bool, SupabaseError> {
        Self::is_admin(self, access_token).await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), SupabaseError> {
        Self::sign_out(self, access_token).await
    }
}

/// Authenticate and authorize an admin.
///
/// # Errors
///
/// Returns `InvalidCredentials` when GoTrue rejects the pair,
/// `NotAuthorized` when the user is not an admin (their session is
/// invalidated first, best-effort), and `Api` for transport failures.
#[instrument(skip(gate, password))]
pub async fn admin_login<G: IdentityGate>(
    gate: &G,
    email: &str,
    password: &str,
) -> Result<CurrentAdmin, AdminLoginError> {
    let auth = match gate.sign_in(email, password).await {
        Ok(auth) => auth,
        Err(SupabaseError::InvalidCredentials) => return Err(AdminLoginError::InvalidCredentials),
        Err(e) => return Err(AdminLoginError::Api(e)),
    };

    let is_admin = match gate.is_admin(&auth.access_token).await {
        Ok(flag) => flag,
        Err(e) => {
            if let Err(out_err) = gate.sign_out(&auth.access_token).await {
                tracing::warn!("Failed to sign out after privilege check error: {out_err}");
            }
            return Err(AdminLoginError::Api(e));
        }
    };

    if !is_admin {
        tracing::warn!(email, "non-admin login attempt on admin panel");
        if let Err(e) = gate.sign_out(&auth.access_token).await {
            tracing::warn!("Failed to sign out non-admin: {e}");
        }
        return Err(AdminLoginError::NotAuthorized);
    }

    Ok(CurrentAdmin {
        id: auth.user.id,
        email: auth.user.email,
        access_token: auth.access_token,
    })
}
