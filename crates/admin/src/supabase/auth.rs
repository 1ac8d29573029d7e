//! GoTrue authentication and the admin privilege check.

use reqwest::Method;
use serde_json::{Value, json};
use tracing::instrument;

use super::types::AuthSession;
use super::{SupabaseClient, SupabaseError};

impl SupabaseClient {
    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::InvalidCredentials` when GoTrue rejects the
    /// email/password pair.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, SupabaseError> {
        let response = self
            .request(Method::POST, "/auth/v1/token?grant_type=password")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::BAD_REQUEST {
            return Err(SupabaseError::InvalidCredentials);
        }

        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    /// Invalidate the user's session server-side.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::Api` if GoTrue rejects the logout call.
    #[instrument(skip(self, access_token))]
    pub async fn sign_out(&self, access_token: &str) -> Result<(), SupabaseError> {
        let response = self
            .authed(Method::POST, "/auth/v1/logout", access_token)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    /// Ask the database whether the caller is an admin.
    ///
    /// Anything other than a literal JSON `true` (including null or a
    /// missing row) counts as not an admin.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError` if the RPC call fails.
    #[instrument(skip(self, access_token))]
    pub async fn is_admin(&self, access_token: &str) -> Result<bool, SupabaseError> {
        let response = self
            .authed(Method::POST, "/rest/v1/rpc/is_admin", access_token)
            .json(&json!({}))
            .send()
            .await?;

        let response = Self::check(response).await?;
        let value: Value = response.json().await?;
        Ok(value == Value::Bool(true))
    }
}
