//! Post-payment and order tracking route handlers.
//!
//! The success page polls for the order because it is recorded by the
//! payment webhook, which may land a few seconds after the redirect.

use std::time::Duration;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::Value;
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::CurrentUser;
use crate::routes::cart::load_store;
use crate::state::AppState;
use crate::supabase::{OrderSummary, OrderTracking};

/// Attempts made to find the order recorded by the payment webhook.
const MAX_RETRIES: u32 = 3;

/// Delay between attempts.
const RETRY_DELAY: Duration = Duration::from_millis(2000);

// =============================================================================
// Success / Cancel
// =============================================================================

/// Query parameters appended by the payment redirect.
#[derive(Debug, Deserialize)]
pub struct SuccessQuery {
    pub session_id: Option<String>,
}

/// Success page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/success.html")]
pub struct SuccessTemplate {
    pub order: Option<OrderSummary>,
    pub error: Option<String>,
    pub user: Option<CurrentUser>,
}

/// Cancel page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/cancel.html")]
pub struct CancelTemplate {
    pub user: Option<CurrentUser>,
}

/// Display the payment confirmation page.
///
/// Polls for the recorded order a few times, then clears the cart once
/// the order is confirmed. The cart is left alone when the order cannot
/// be found so the customer loses nothing.
#[instrument(skip(state, session, user, query))]
pub async fn success(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Query(query): Query<SuccessQuery>,
) -> impl IntoResponse {
    let Some(session_id) = query.session_id else {
        return SuccessTemplate {
            order: None,
            error: Some("Commande introuvable. Veuillez contacter le support.".to_string()),
            user: Some(user),
        };
    };

    let mut order = None;
    for attempt in 0..MAX_RETRIES {
        match state
            .supabase()
            .get_order_by_checkout_session(&user.access_token, &session_id)
            .await
        {
            Ok(Some(found)) => {
                order = Some(found);
                break;
            }
            Ok(None) => {
                tracing::debug!(attempt, "order not recorded yet, retrying");
            }
            Err(e) => {
                tracing::warn!(attempt, "order lookup failed: {e}");
            }
        }
        if attempt + 1 < MAX_RETRIES {
            tokio::time::sleep(RETRY_DELAY).await;
        }
    }

    if order.is_some() {
        let mut store = load_store(&state, &session, Some(&user)).await;
        if let Err(e) = store.clear().await {
            tracing::warn!("Cart mirror clear after payment failed: {e}");
        }
    }

    let error = order
        .is_none()
        .then(|| "Commande introuvable. Veuillez contacter le support.".to_string());

    SuccessTemplate {
        order,
        error,
        user: Some(user),
    }
}

/// Display the payment cancelled page. The cart is untouched.
#[instrument(skip(user))]
pub async fn cancel(OptionalAuth(user): OptionalAuth) -> impl IntoResponse {
    CancelTemplate { user }
}

// =============================================================================
// Tracking
// =============================================================================

/// An uploaded design attached to an order, with its public URL.
pub struct OrderFileView {
    pub name: String,
    pub url: String,
}

/// One order with its tracking info and attached designs.
pub struct TrackedOrder {
    pub order: OrderSummary,
    pub tracking: Option<OrderTracking>,
    pub files: Vec<OrderFileView>,
}

/// Tracking page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/tracking.html")]
pub struct TrackingTemplate {
    pub orders: Vec<TrackedOrder>,
    pub user: Option<CurrentUser>,
}

/// Pull name/url pairs out of the recorded `uploaded_files` document,
/// skipping the nulls left by file-less items.
fn parse_order_files(value: Option<&Value>) -> Vec<OrderFileView> {
    let Some(Value::Array(entries)) = value else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let name = entry.get("name")?.as_str()?;
            let url = entry.get("url")?.as_str()?;
            Some(OrderFileView {
                name: name.to_string(),
                url: url.to_string(),
            })
        })
        .collect()
}

/// Display the order tracking page: every order, most recent first, with
/// its shipment status and uploaded designs.
#[instrument(skip(state, user))]
pub async fn tracking(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> crate::error::Result<TrackingTemplate> {
    let summaries = state.supabase().get_orders(&user.access_token).await?;

    let mut orders = Vec::with_capacity(summaries.len());
    for order in summaries {
        let tracking = state
            .supabase()
            .get_tracking(&user.access_token, order.order_id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(order_id = %order.order_id, "tracking lookup failed: {e}");
                None
            });

        let files = state
            .supabase()
            .get_order_files(&user.access_token, order.order_id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(order_id = %order.order_id, "file lookup failed: {e}");
                None
            });

        orders.push(TrackedOrder {
            order,
            tracking,
            files: parse_order_files(files.and_then(|f| f.uploaded_files).as_ref()),
        });
    }

    Ok(TrackingTemplate {
        orders,
        user: Some(user),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_parse_order_files_skips_nulls() {
        let value = json!([
            { "path": "u1/a.png", "name": "a.png", "type": "image/png", "url": "https://cdn.test/a.png" },
            null,
            { "name": "b.png" },
        ]);

        let files = parse_order_files(Some(&value));
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "a.png");
        assert_eq!(files[0].url, "https://cdn.test/a.png");
    }

    #[test]
    fn test_parse_order_files_handles_missing_document() {
        assert!(parse_order_files(None).is_empty());
        assert!(parse_order_files(Some(&Value::Null)).is_empty());
    }
}
