//! Checkout route handlers.
//!
//! Collects the shipping address, saves it on the profile, and redirects
//! the customer to the hosted payment page. Requires a logged-in user:
//! the payment edge function runs under the caller's access token.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use starterprint_core::ShippingAddress;

use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::routes::cart::{CartView, load_store};
use crate::services::start_checkout;
use crate::state::AppState;

/// Shipping address form data.
#[derive(Debug, Deserialize)]
pub struct AddressForm {
    pub company_name: Option<String>,
    pub line1: String,
    pub line2: Option<String>,
    pub postal_code: String,
    pub city: String,
}

impl AddressForm {
    /// Only France is shippable, so the country is fixed.
    pub(crate) fn into_address(self) -> ShippingAddress {
        ShippingAddress {
            company_name: self.company_name.filter(|s| !s.trim().is_empty()),
            line1: self.line1,
            line2: self.line2.filter(|s| !s.trim().is_empty()),
            postal_code: self.postal_code,
            city: self.city,
            country: "France".to_string(),
        }
    }
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub cart: CartView,
    pub address: Option<ShippingAddress>,
    pub error: Option<String>,
    pub user: Option<CurrentUser>,
}

/// Display the checkout page with the order summary and address form,
/// prefilled from the saved profile address.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> impl IntoResponse {
    let store = load_store(&state, &session, Some(&user)).await;

    let address = match state.supabase().get_profile(user.id, &user.access_token).await {
        Ok(profile) => profile.and_then(|p| p.shipping_address),
        Err(e) => {
            tracing::warn!("Failed to load profile for checkout prefill: {e}");
            None
        }
    };

    CheckoutTemplate {
        cart: CartView::from_store(&store),
        address,
        error: None,
        user: Some(user),
    }
}

/// Handle the checkout form: save the address and redirect to the hosted
/// payment page.
#[instrument(skip(state, session, user, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddressForm>,
) -> Response {
    let store = load_store(&state, &session, Some(&user)).await;
    let address = form.into_address();

    // Required fields are checked here, before the profile upsert and the
    // payment call, so a failure renders inline
    if let Err(e) = address.validate() {
        return CheckoutTemplate {
            cart: CartView::from_store(&store),
            address: Some(address),
            error: Some(e.to_string()),
            user: Some(user),
        }
        .into_response();
    }

    let item_count = store.items().len().to_string();
    crate::error::add_breadcrumb(
        "checkout",
        "Checkout started",
        Some(&[("items", item_count.as_str())]),
    );

    // Saved for next time; a failure here must not block the payment
    if let Err(e) = state
        .supabase()
        .upsert_shipping_address(user.id, &user.access_token, &address)
        .await
    {
        tracing::warn!("Failed to save shipping address: {e}");
    }

    match start_checkout(
        state.supabase(),
        &user.access_token,
        store.items(),
        &address,
        &state.config().base_url,
    )
    .await
    {
        Ok(url) => Redirect::to(&url).into_response(),
        Err(e) => {
            tracing::error!("Checkout failed: {e}");
            CheckoutTemplate {
                cart: CartView::from_store(&store),
                address: Some(address),
                error: Some(e.to_string()),
                user: Some(user),
            }
            .into_response()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(line1: &str, postal_code: &str, city: &str) -> AddressForm {
        AddressForm {
            company_name: None,
            line1: line1.to_string(),
            line2: None,
            postal_code: postal_code.to_string(),
            city: city.to_string(),
        }
    }

    #[test]
    fn test_blank_required_field_fails_validation() {
        // The submit handler renders this error inline instead of calling
        // the profile upsert or the payment function
        let err = form("  ", "75002", "Paris").into_address().validate();
        assert_eq!(err.unwrap_err().to_string(), "champ requis manquant : adresse");

        let err = form("12 rue de la Paix", "", "Paris").into_address().validate();
        assert_eq!(
            err.unwrap_err().to_string(),
            "champ requis manquant : code postal"
        );
    }

    #[test]
    fn test_complete_form_passes_validation() {
        let address = form("12 rue de la Paix", "75002", "Paris").into_address();
        assert!(address.validate().is_ok());
        assert_eq!(address.country, "France");
    }
}
