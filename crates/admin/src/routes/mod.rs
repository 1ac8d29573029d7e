//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Dashboard
//! GET  /health                 - Health check
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action (credentials + privilege check)
//! POST /auth/logout            - Logout action
//!
//! # Customers (requires admin)
//! GET  /customers              - Customer list with lifetime stats
//!
//! # Orders (requires admin)
//! GET  /orders                         - Order list with tracking state
//! POST /orders/{id}/status             - Update shipment status (fragment)
//! POST /orders/{id}/tracking           - Record shipping details (fragment)
//! ```

pub mod auth;
pub mod customers;
pub mod dashboard;
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
        .route("/logout", post(auth::logout))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}/status", post(orders::update_status))
        .route("/{id}/tracking", post(orders::update_tracking))
}

/// Create all routes for the admin panel.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .route("/customers", get(customers::index))
        .nest("/orders", order_routes())
        .nest("/auth", auth_routes())
}
