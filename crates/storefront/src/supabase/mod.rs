//! Supabase API client.
//!
//! Supabase is the source of truth for user accounts, profiles, orders and
//! uploaded files. There is NO local sync: every call goes straight to the
//! hosted APIs.
//!
//! # APIs
//!
//! - GoTrue (`/auth/v1`) - email/password authentication
//! - PostgREST (`/rest/v1`) - `user_profiles`, `stripe_user_orders`,
//!   `order_tracking`
//! - Storage (`/storage/v1`) - customer photo uploads
//! - Edge functions (`/functions/v1`) - Stripe checkout session creation
//!
//! # Example
//!
//! ```rust,ignore
//! use starterprint_storefront::supabase::SupabaseClient;
//!
//! let client = SupabaseClient::new(&config.supabase);
//! let session = client.sign_in("jean@example.com", "motdepasse").await?;
//! let profile = client.get_profile(session.user.id, &session.access_token).await?;
//! ```

mod auth;
mod functions;
mod rest;
mod storage;
pub mod types;

pub use storage::{MAX_UPLOAD_BYTES, UploadError};
pub use types::*;

use std::sync::Arc;

use reqwest::Method;
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::SupabaseConfig;

/// Errors that can occur when interacting with Supabase APIs.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Wrong email or password.
    #[error("Invalid credentials")]
    InvalidCredentials,
}

/// Client for the Supabase APIs.
///
/// Cheaply cloneable via `Arc`. All requests carry the anon key; calls made
/// on behalf of a logged-in user additionally carry their access token.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<SupabaseClientInner>,
}

struct SupabaseClientInner {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    storage_bucket: String,
}

impl SupabaseClient {
    /// Create a new Supabase client.
    #[must_use]
    pub fn new(config: &SupabaseConfig) -> Self {
        Self {
            inner: Arc::new(SupabaseClientInner {
                http: reqwest::Client::new(),
                base_url: config.url.trim_end_matches('/').to_string(),
                anon_key: config.anon_key.expose_secret().to_string(),
                storage_bucket: config.storage_bucket.clone(),
            }),
        }
    }

    /// Name of the storage bucket holding customer uploads.
    #[must_use]
    pub fn storage_bucket(&self) -> &str {
        &self.inner.storage_bucket
    }

    /// Public URL for an object in the upload bucket.
    #[must_use]
    pub fn public_object_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.inner.base_url, self.inner.storage_bucket, path
        )
    }

    /// Build a request carrying the anon key only.
    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.inner
            .http
            .request(method, format!("{}{path}", self.inner.base_url))
            .header("apikey", &self.inner.anon_key)
    }

    /// Build a request authenticated as a user.
    fn authed(&self, method: Method, path: &str, access_token: &str) -> reqwest::RequestBuilder {
        self.request(method, path)
            .bearer_auth(access_token)
    }

    /// Check a response status, surfacing the body on failure.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, SupabaseError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "(no response body)".to_string());
        tracing::warn!(
            status = %status,
            body = %message.chars().take(500).collect::<String>(),
            "Supabase API returned non-success status"
        );
        Err(SupabaseError::Api {
            status: status.as_u16(),
            message: message.chars().take(200).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn test_config() -> SupabaseConfig {
        SupabaseConfig {
            url: "https://test.supabase.co/".to_string(),
            anon_key: SecretString::from("anon"),
            storage_bucket: "starter-pack-files".to_string(),
        }
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = SupabaseClient::new(&test_config());
        assert_eq!(
            client.public_object_url("abc/photo.png"),
            "https://test.supabase.co/storage/v1/object/public/starter-pack-files/abc/photo.png"
        );
    }

    #[test]
    fn test_supabase_error_display() {
        let err = SupabaseError::NotFound("order 42".to_string());
        assert_eq!(err.to_string(), "Not found: order 42");

        let err = SupabaseError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "API error (500): boom");
    }
}
