//! PostgREST calls against the admin views and tracking table.

use reqwest::Method;
use serde_json::json;
use tracing::instrument;

use starterprint_core::{OrderId, ShipmentStatus};

use super::types::{AdminCustomer, AdminOrder, OrderTracking, TrackingUpdate};
use super::{SupabaseClient, SupabaseError};

impl SupabaseClient {
    /// List every customer, most recently active first.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError` if the API call fails.
    #[instrument(skip(self, access_token))]
    pub async fn list_customers(
        &self,
        access_token: &str,
    ) -> Result<Vec<AdminCustomer>, SupabaseError> {
        let path = "/rest/v1/admin_customers?select=*&order=last_order_date.desc.nullslast";
        let response = self.authed(Method::GET, path, access_token).send().await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    /// List every order, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError` if the API call fails.
    #[instrument(skip(self, access_token))]
    pub async fn list_orders(&self, access_token: &str) -> Result<Vec<AdminOrder>, SupabaseError> {
        let path = "/rest/v1/admin_orders?select=*&order=order_date.desc";
        let response = self.authed(Method::GET, path, access_token).send().await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
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

    /// Update the shipment status of an order's tracking row.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError` if the API call fails.
    #[instrument(skip(self, access_token))]
    pub async fn update_order_status(
        &self,
        access_token: &str,
        order_id: OrderId,
        status: ShipmentStatus,
    ) -> Result<(), SupabaseError> {
        let path = format!("/rest/v1/order_tracking?order_id=eq.{order_id}");
        let response = self
            .authed(Method::PATCH, &path, access_token)
            .json(&json!({ "status": status, "updated_at": chrono::Utc::now() }))
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    /// Record shipping details for an order.
    ///
    /// Creates or replaces the tracking row, setting the status to
    /// `shipped` in the same write.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError` if the API call fails.
    #[instrument(skip(self, access_token, update))]
    pub async fn upsert_tracking(
        &self,
        access_token: &str,
        order_id: OrderId,
        update: &TrackingUpdate,
    ) -> Result<(), SupabaseError> {
        let response = self
            .authed(Method::POST, "/rest/v1/order_tracking", access_token)
            .header("Prefer", "resolution=merge-duplicates")
            .json(&json!({
                "order_id": order_id,
                "tracking_number": update.tracking_number,
                "carrier": update.carrier,
                "estimated_delivery": update.estimated_delivery,
                "status": ShipmentStatus::Shipped,
                "updated_at": chrono::Utc::now(),
            }))
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}
