//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use rust_decimal::Decimal;
use tracing::instrument;

use starterprint_core::ShipmentStatus;

use crate::filters;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Dashboard summary figures.
pub struct DashboardStats {
    pub total_orders: usize,
    pub total_customers: usize,
    pub revenue: Decimal,
    pub awaiting_shipment: usize,
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub stats: DashboardStats,
    pub admin_email: String,
}

/// Display the dashboard: headline figures derived from the admin views.
#[instrument(skip(state, admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> crate::error::Result<DashboardTemplate> {
    let orders = state.supabase().list_orders(&admin.access_token).await?;
    let customers = state.supabase().list_customers(&admin.access_token).await?;

    let revenue = orders
        .iter()
        .map(crate::supabase::AdminOrder::amount_total_major)
        .sum();

    // Orders whose tracking has not reached "shipped" yet
    let mut awaiting_shipment = 0;
    for order in &orders {
        let tracking = state
            .supabase()
            .get_tracking(&admin.access_token, order.order_id)
            .await?;
        let status = tracking.map_or(ShipmentStatus::Pending, |t| t.status);
        if matches!(status, ShipmentStatus::Pending | ShipmentStatus::Processing) {
            awaiting_shipment += 1;
        }
    }

    Ok(DashboardTemplate {
        stats: DashboardStats {
            total_orders: orders.len(),
            total_customers: customers.len(),
            revenue,
            awaiting_shipment,
        },
        admin_email: admin.email.as_str().to_string(),
    })
}
