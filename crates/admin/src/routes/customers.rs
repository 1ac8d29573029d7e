//! Customer list route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::filters;
use crate::middleware::RequireAdmin;
use crate::state::AppState;
use crate::supabase::AdminCustomer;

/// Customer list template.
#[derive(Template, WebTemplate)]
#[template(path = "customers.html")]
pub struct CustomersTemplate {
    pub customers: Vec<AdminCustomer>,
}

/// Display every customer with their lifetime order count and spend.
#[instrument(skip(state, admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> crate::error::Result<CustomersTemplate> {
    let customers = state.supabase().list_customers(&admin.access_token).await?;
    Ok(CustomersTemplate { customers })
}
