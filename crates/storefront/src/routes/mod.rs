//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//!
//! # Customization (3-step flow)
//! GET  /personnaliser          - Step 1: figurine details form
//! POST /personnaliser          - Save details, go to step 2
//! GET  /personnaliser/prompt   - Step 2: generated design prompt
//! GET  /personnaliser/upload   - Step 3: image upload form
//! POST /personnaliser/upload   - Upload image, add item to cart
//!
//! # Cart (HTMX fragments)
//! GET  /panier                 - Cart page
//! POST /panier/update          - Update quantity (returns cart_items fragment)
//! POST /panier/remove          - Remove item (returns cart_items fragment)
//! POST /panier/clear           - Empty the cart (returns cart_items fragment)
//! GET  /panier/count           - Cart count badge (fragment)
//!
//! # Checkout (requires auth)
//! GET  /commande               - Shipping address + order summary
//! POST /commande               - Save address, redirect to hosted payment page
//! GET  /success                - Post-payment confirmation (polls for the order)
//! GET  /cancel                 - Payment cancelled page
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action
//! POST /auth/logout            - Logout action
//!
//! # Account (requires auth)
//! GET  /compte                 - Account overview with order history
//! POST /compte/adresse         - Save the shipping address
//! GET  /suivi                  - Order tracking page
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod customize;
pub mod home;
pub mod orders;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the customization routes router.
pub fn customize_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(customize::form_page).post(customize::save_form))
        .route("/prompt", get(customize::prompt_page))
        .route(
            "/upload",
            get(customize::upload_page).post(customize::upload),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Customization flow
        .nest("/personnaliser", customize_routes())
        // Cart routes
        .nest("/panier", cart_routes())
        // Checkout
        .route(
            "/commande",
            get(checkout::show).post(checkout::submit),
        )
        .route("/success", get(orders::success))
        .route("/cancel", get(orders::cancel))
        // Order tracking
        .route("/suivi", get(orders::tracking))
        // Account
        .route("/compte", get(account::show))
        .route("/compte/adresse", post(account::update_address))
        // Auth routes
        .nest("/auth", auth_routes())
}
