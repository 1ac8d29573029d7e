//! GoTrue authentication calls.

use reqwest::Method;
use serde_json::json;
use tracing::instrument;

use super::types::AuthSession;
use super::{SupabaseClient, SupabaseError};

impl SupabaseClient {
    /// Register a new user with email and password.
    ///
    /// Email confirmation is disabled on the project, so GoTrue returns a
    /// usable session straight away.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::Api` if registration is rejected (e.g. the
    /// email is already taken).
    #[instrument(skip(self, password))]
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, SupabaseError> {
        let response = self
            .request(Method::POST, "/auth/v1/signup")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

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
}
