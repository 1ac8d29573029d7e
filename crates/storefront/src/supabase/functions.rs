//! Edge function calls.

use reqwest::Method;
use tracing::instrument;

use super::types::{CheckoutSessionRequest, CheckoutSessionResponse};
use super::{SupabaseClient, SupabaseError};

impl SupabaseClient {
    /// Create a Stripe checkout session via the `stripe-checkout` edge
    /// function.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError` if the function call fails or returns a
    /// non-success status.
    #[instrument(skip(self, access_token, request), fields(line_items = request.line_items.len()))]
    pub async fn create_checkout_session(
        &self,
        access_token: &str,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSessionResponse, SupabaseError> {
        let response = self
            .authed(Method::POST, "/functions/v1/stripe-checkout", access_token)
            .json(request)
            .send()
            .await?;

        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }
}
