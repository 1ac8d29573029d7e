//! Supabase API client for the admin panel.
//!
//! # APIs
//!
//! - GoTrue (`/auth/v1`) - email/password authentication
//! - PostgREST (`/rest/v1`) - `admin_customers` and `admin_orders` views,
//!   `order_tracking` writes, `is_admin` RPC
//!
//! Every data call runs under the logged-in admin's access token; the
//! admin-only views are protected by row-level security policies that
//! consult the same `is_admin` function used at login.

mod auth;
mod rest;
pub mod types;

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
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<SupabaseClientInner>,
}

struct SupabaseClientInner {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
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
            }),
        }
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
        self.request(method, path).bearer_auth(access_token)
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
