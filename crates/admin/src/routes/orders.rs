//! Order management route handlers.
//!
//! Status and tracking updates are HTMX fragments: each order row carries
//! a tracking cell that is swapped in place after an update, with the
//! French error banner rendered inside the cell on failure.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::instrument;

use starterprint_core::{OrderId, ShipmentStatus};

use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::CurrentAdmin;
use crate::state::AppState;
use crate::supabase::{AdminOrder, OrderTracking, TrackingUpdate};

// =============================================================================
// Form Types
// =============================================================================

/// Status update form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// Tracking details form data.
#[derive(Debug, Deserialize)]
pub struct TrackingForm {
    pub tracking_number: String,
    pub carrier: String,
    #[serde(default, deserialize_with = "empty_date_as_none")]
    pub estimated_delivery: Option<NaiveDate>,
}

/// Browsers submit an empty string for a blank `<input type="date">`.
fn empty_date_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

// =============================================================================
// Templates
// =============================================================================

/// One order with its current tracking state.
pub struct OrderRow {
    pub order: AdminOrder,
    pub tracking: Option<OrderTracking>,
    /// Inline error for the tracking cell; always `None` on a full page load.
    pub error: Option<String>,
}

/// Order list template.
#[derive(Template, WebTemplate)]
#[template(path = "orders.html")]
pub struct OrdersTemplate {
    pub rows: Vec<OrderRow>,
    pub statuses: Vec<ShipmentStatus>,
}

/// Tracking cell fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/tracking_cell.html")]
pub struct TrackingCellTemplate {
    pub order_id: OrderId,
    pub tracking: Option<OrderTracking>,
    pub statuses: Vec<ShipmentStatus>,
    pub error: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display every order, most recent first, with its tracking state.
#[instrument(skip(state, admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> crate::error::Result<OrdersTemplate> {
    let orders = state.supabase().list_orders(&admin.access_token).await?;

    let mut rows = Vec::with_capacity(orders.len());
    for order in orders {
        let tracking = state
            .supabase()
            .get_tracking(&admin.access_token, order.order_id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(order_id = %order.order_id, "tracking lookup failed: {e}");
                None
            });
        rows.push(OrderRow {
            order,
            tracking,
            error: None,
        });
    }

    Ok(OrdersTemplate {
        rows,
        statuses: ShipmentStatus::ALL.to_vec(),
    })
}

/// Re-render a tracking cell after a write, fetching the fresh row.
async fn tracking_cell(
    state: &AppState,
    admin: &CurrentAdmin,
    order_id: OrderId,
    error: Option<String>,
) -> TrackingCellTemplate {
    let tracking = state
        .supabase()
        .get_tracking(&admin.access_token, order_id)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(order_id = %order_id, "tracking lookup failed: {e}");
            None
        });

    TrackingCellTemplate {
        order_id,
        tracking,
        statuses: ShipmentStatus::ALL.to_vec(),
        error,
    }
}

/// Update the shipment status of an order (HTMX).
#[instrument(skip(state, admin))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i64>,
    Form(form): Form<StatusForm>,
) -> impl IntoResponse {
    let order_id = OrderId::new(id);
    let status = ShipmentStatus::parse_lossy(&form.status);

    let error = state
        .supabase()
        .update_order_status(&admin.access_token, order_id, status)
        .await
        .err()
        .map(|e| {
            tracing::error!(order_id = %order_id, "status update failed: {e}");
            "Erreur lors de la mise à jour du statut".to_string()
        });

    tracking_cell(&state, &admin, order_id, error).await
}

/// Record shipping details for an order (HTMX).
///
/// Sets the status to `shipped` in the same write.
#[instrument(skip(state, admin, form))]
pub async fn update_tracking(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<i64>,
    Form(form): Form<TrackingForm>,
) -> impl IntoResponse {
    let order_id = OrderId::new(id);
    let update = TrackingUpdate {
        tracking_number: form.tracking_number,
        carrier: form.carrier,
        estimated_delivery: form.estimated_delivery,
    };

    let error = state
        .supabase()
        .upsert_tracking(&admin.access_token, order_id, &update)
        .await
        .err()
        .map(|e| {
            tracing::error!(order_id = %order_id, "tracking update failed: {e}");
            "Erreur lors de la mise à jour du suivi".to_string()
        });

    tracking_cell(&state, &admin, order_id, error).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_estimated_delivery_is_none() {
        let form: TrackingForm = serde_json::from_value(serde_json::json!({
            "tracking_number": "LP123456789FR",
            "carrier": "Colissimo",
            "estimated_delivery": "",
        }))
        .unwrap();
        assert!(form.estimated_delivery.is_none());
    }

    #[test]
    fn test_estimated_delivery_parses_iso_date() {
        let form: TrackingForm = serde_json::from_value(serde_json::json!({
            "tracking_number": "LP123456789FR",
            "carrier": "Colissimo",
            "estimated_delivery": "2026-09-15",
        }))
        .unwrap();
        assert_eq!(
            form.estimated_delivery,
            Some(NaiveDate::from_ymd_opt(2026, 9, 15).unwrap())
        );
    }
}
