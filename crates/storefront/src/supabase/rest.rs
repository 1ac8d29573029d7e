//! PostgREST calls for profiles, orders and tracking.
//!
//! All queries run under the caller's access token so row-level security
//! scopes results to the logged-in user.

use reqwest::Method;
use serde_json::json;
use tracing::instrument;

use starterprint_core::{CartItem, OrderId, ShippingAddress, UserId};

use super::types::{OrderFiles, OrderSummary, OrderTracking, UserProfile};
use super::{SupabaseClient, SupabaseError};

impl SupabaseClient {
    /// Fetch the user's profile row, if one exists.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError` if the API call fails.
    #[instrument(skip(self, access_token))]
    pub async fn get_profile(
        &self,
        user_id: UserId,
        access_token: &str,
    ) -> Result<Option<UserProfile>, SupabaseError> {
        let path = format!("/rest/v1/user_profiles?id=eq.{user_id}&select=*");
        let response = self.authed(Method::GET, &path, access_token).send().await?;
        let response = Self::check(response).await?;

        let mut rows: Vec<UserProfile> = response.json().await?;
        Ok(rows.pop())
    }

    /// Upsert the user's mirrored cart item list.
    ///
    /// The whole list is rewritten on every call (last writer wins).
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError` if the API call fails.
    #[instrument(skip(self, access_token, items), fields(items = items.len()))]
    pub async fn upsert_cart(
        &self,
        user_id: UserId,
        access_token: &str,
        items: &[CartItem],
    ) -> Result<(), SupabaseError> {
        let response = self
            .authed(Method::POST, "/rest/v1/user_profiles", access_token)
            .header("Prefer", "resolution=merge-duplicates")
            .json(&json!({
                "id": user_id,
                "cart_items": items,
                "updated_at": chrono::Utc::now(),
            }))
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    /// Upsert the user's saved shipping address.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError` if the API call fails.
    #[instrument(skip(self, access_token, address))]
    pub async fn upsert_shipping_address(
        &self,
        user_id: UserId,
        access_token: &str,
        address: &ShippingAddress,
    ) -> Result<(), SupabaseError> {
        let response = self
            .authed(Method::POST, "/rest/v1/user_profiles", access_token)
            .header("Prefer", "resolution=merge-duplicates")
            .json(&json!({
                "id": user_id,
                "shipping_address": address,
                "updated_at": chrono::Utc::now(),
            }))
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    /// List the user's orders, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError` if the API call fails.
    #[instrument(skip(self, access_token))]
    pub async fn get_orders(&self, access_token: &str) -> Result<Vec<OrderSummary>, SupabaseError> {
        let path = "/rest/v1/stripe_user_orders?select=*&order=order_date.desc";
        let response = self.authed(Method::GET, path, access_token).send().await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    /// Look up an order by its Stripe checkout session ID.
    ///
    /// Returns `None` while the fulfilment webhook has not recorded the
    /// order yet.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError` if the API call fails.
    #[instrument(skip(self, access_token))]
    pub async fn get_order_by_checkout_session(
        &self,
        access_token: &str,
        checkout_session_id: &str,
    ) -> Result<Option<OrderSummary>, SupabaseError> {
        let path = format!(
            "/rest/v1/stripe_user_orders?checkout_session_id=eq.{checkout_session_id}&select=*"
        );
        let response = self.authed(Method::GET, &path, access_token).send().await?;
        let response = Self::check(response).await?;

        let mut rows: Vec<OrderSummary> = response.json().await?;
        Ok(rows.pop())
    }

    /// Fetch tracking info for an order, if any has been recorded.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError` if the API call fails.
    #[instrument(skip(self, access_token))]
    pub async fn get_tracking(
        &self,
        access_token: &str,
        order_id: OrderId,
    ) -> Result<Option<OrderTracking>, SupabaseError> {
        let path = format!("/rest/v1/order_tracking?order_id=eq.{order_id}&select=*");
        let response = self.authed(Method::GET, &path, access_token).send().await?;
        let response = Self::check(response).await?;

        let mut rows: Vec<OrderTracking> = response.json().await?;
        Ok(rows.pop())
    }

    /// Fetch the uploaded files recorded on an order.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError` if the API call fails.
    #[instrument(skip(self, access_token))]
    pub async fn get_order_files(
        &self,
        access_token: &str,
        order_id: OrderId,
    ) -> Result<Option<OrderFiles>, SupabaseError> {
        let path = format!("/rest/v1/stripe_orders?id=eq.{order_id}&select=uploaded_files");
        let response = self.authed(Method::GET, &path, access_token).send().await?;
        let response = Self::check(response).await?;

        let mut rows: Vec<OrderFiles> = response.json().await?;
        Ok(rows.pop())
    }
}
