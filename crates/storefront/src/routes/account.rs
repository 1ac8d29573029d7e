//! Account route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::Form;
use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::instrument;

use starterprint_core::ShippingAddress;

use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::routes::checkout::AddressForm;
use crate::state::AppState;
use crate::supabase::OrderSummary;

/// Account overview template.
#[derive(Template, WebTemplate)]
#[template(path = "account/show.html")]
pub struct AccountTemplate {
    pub address: Option<ShippingAddress>,
    pub orders: Vec<OrderSummary>,
    pub error: Option<String>,
    pub user: Option<CurrentUser>,
}

/// Display the account overview: saved shipping address and order
/// history, most recent first.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> crate::error::Result<AccountTemplate> {
    let address = state
        .supabase()
        .get_profile(user.id, &user.access_token)
        .await?
        .and_then(|p| p.shipping_address);

    let orders = state.supabase().get_orders(&user.access_token).await?;

    Ok(AccountTemplate {
        address,
        orders,
        error: None,
        user: Some(user),
    })
}

/// Save the shipping address edited from the account page.
///
/// Required fields are checked before the profile upsert; a validation
/// failure re-renders the page with the error inline.
#[instrument(skip(state, user, form))]
pub async fn update_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddressForm>,
) -> crate::error::Result<Response> {
    let address = form.into_address();

    if let Err(e) = address.validate() {
        let orders = state.supabase().get_orders(&user.access_token).await?;
        return Ok(AccountTemplate {
            address: Some(address),
            orders,
            error: Some(e.to_string()),
            user: Some(user),
        }
        .into_response());
    }

    state
        .supabase()
        .upsert_shipping_address(user.id, &user.access_token, &address)
        .await?;
    Ok(Redirect::to("/compte").into_response())
}
