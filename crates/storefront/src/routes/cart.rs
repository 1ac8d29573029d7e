//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Each request rebuilds the store from the session payload (plus the
//! profile mirror when the customer is signed in), mutates it, and renders
//! a fragment. Mirror failures are logged, never shown: local state is
//! already persisted by the time the mirror is written.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use starterprint_core::{CartItem, CartItemId};

use crate::cart::{CartStore, ProfileMirror, SessionCartStorage};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: CartItemId,
    pub title: String,
    pub image_url: String,
    pub quantity: u32,
    pub price: String,
    pub has_file: bool,
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            image_url: item.image_url.clone(),
            quantity: item.quantity,
            price: format!("{} €", item.tier().price()),
            has_file: item.uploaded_file.is_some(),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub item_count: usize,
}

impl CartView {
    pub fn from_store<S, M>(store: &CartStore<S, M>) -> Self
    where
        S: crate::cart::CartStorage,
        M: crate::cart::CartMirror,
    {
        Self {
            items: store.items().iter().map(CartItemView::from).collect(),
            total: format!("{} €", store.total()),
            item_count: store.item_count(),
        }
    }
}

/// Build the per-request cart store from the session and, when signed in,
/// the user's profile mirror.
pub async fn load_store(
    state: &AppState,
    session: &Session,
    user: Option<&CurrentUser>,
) -> CartStore<SessionCartStorage, ProfileMirror> {
    let mirror = user.map(|u| {
        ProfileMirror::new(state.supabase().clone(), u.id, u.access_token.clone())
    });
    CartStore::load(SessionCartStorage::new(session.clone()), mirror).await
}

// =============================================================================
// Form Types
// =============================================================================

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub item_id: CartItemId,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub item_id: CartItemId,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub user: Option<CurrentUser>,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: usize,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart page.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> impl IntoResponse {
    let store = load_store(&state, &session, user.as_ref()).await;

    CartShowTemplate {
        cart: CartView::from_store(&store),
        user,
    }
}

/// Update a line item's quantity (HTMX).
///
/// Quantities outside the supported tiers leave the cart unchanged.
#[instrument(skip(state, session, user))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<UpdateCartForm>,
) -> Response {
    let mut store = load_store(&state, &session, user.as_ref()).await;
    if let Err(e) = store.update_quantity(form.item_id, form.quantity).await {
        tracing::warn!("Cart mirror update failed: {e}");
    }

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from_store(&store),
        },
    )
        .into_response()
}

/// Remove a line item (HTMX).
#[instrument(skip(state, session, user))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    let mut store = load_store(&state, &session, user.as_ref()).await;
    if let Err(e) = store.remove_item(form.item_id).await {
        tracing::warn!("Cart mirror update failed: {e}");
    }

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from_store(&store),
        },
    )
        .into_response()
}

/// Empty the cart (HTMX).
#[instrument(skip(state, session, user))]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Response {
    let mut store = load_store(&state, &session, user.as_ref()).await;
    if let Err(e) = store.clear().await {
        tracing::warn!("Cart mirror update failed: {e}");
    }

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from_store(&store),
        },
    )
        .into_response()
}

/// Cart count badge fragment (HTMX).
#[instrument(skip(state, session, user))]
pub async fn count(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> impl IntoResponse {
    let store = load_store(&state, &session, user.as_ref()).await;
    CartCountTemplate {
        count: store.item_count(),
    }
}
