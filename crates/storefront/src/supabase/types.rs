//! Wire types for the Supabase APIs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use starterprint_core::{CartItem, Email, OrderId, ShipmentStatus, ShippingAddress, UserId};

// =============================================================================
// GoTrue (auth)
// =============================================================================

/// Authenticated user as returned by GoTrue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    pub email: Email,
}

/// A GoTrue session (password grant response).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub user: AuthUser,
}

// =============================================================================
// PostgREST (user_profiles, orders, tracking)
// =============================================================================

/// Row in the `user_profiles` table.
///
/// `cart_items` mirrors the full in-memory item list, rewritten wholesale on
/// every cart mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    #[serde(default)]
    pub cart_items: Option<Vec<CartItem>>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Row in the `stripe_user_orders` view (current user's orders).
#[derive(Debug, Clone, Deserialize)]
pub struct OrderSummary {
    pub order_id: OrderId,
    pub checkout_session_id: String,
    pub order_date: DateTime<Utc>,
    /// Total in minor units (cents).
    pub amount_total: i64,
    pub currency: String,
    #[serde(default)]
    pub order_status: Option<String>,
}

impl OrderSummary {
    /// Total in major units (euros).
    #[must_use]
    pub fn amount_total_major(&self) -> rust_decimal::Decimal {
        rust_decimal::Decimal::new(self.amount_total, 2)
    }
}

/// Columns selected from `stripe_orders` when only files are needed.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderFiles {
    #[serde(default)]
    pub uploaded_files: Option<Value>,
}

/// Row in the `order_tracking` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderTracking {
    pub order_id: OrderId,
    #[serde(default)]
    pub status: ShipmentStatus,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub estimated_delivery: Option<NaiveDate>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
}

// =============================================================================
// Edge functions (Stripe checkout)
// =============================================================================

/// A Stripe line item (price ID plus quantity).
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutLineItem {
    pub price: String,
    pub quantity: u32,
}

/// Country restriction for Stripe's shipping address collection.
#[derive(Debug, Clone, Serialize)]
pub struct ShippingAddressCollection {
    pub allowed_countries: Vec<String>,
}

/// Metadata attached to the checkout session.
///
/// Both fields are JSON documents serialized to strings, matching what the
/// fulfilment webhook expects to find on the Stripe session.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutMetadata {
    pub shipping_address: String,
    pub uploaded_files: String,
}

/// Request body for the `stripe-checkout` edge function.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSessionRequest {
    pub line_items: Vec<CheckoutLineItem>,
    pub mode: String,
    pub success_url: String,
    pub cancel_url: String,
    pub shipping_address_collection: ShippingAddressCollection,
    pub metadata: CheckoutMetadata,
}

/// Response from the `stripe-checkout` edge function.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSessionResponse {
    /// Hosted checkout page to redirect the customer to.
    pub url: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_summary_amount_major() {
        let order = OrderSummary {
            order_id: OrderId::new(42),
            checkout_session_id: "cs_test_123".to_string(),
            order_date: Utc::now(),
            amount_total: 2950,
            currency: "eur".to_string(),
            order_status: Some("completed".to_string()),
        };
        assert_eq!(order.amount_total_major().to_string(), "29.50");
    }

    #[test]
    fn test_checkout_request_serializes_stripe_shape() {
        let request = CheckoutSessionRequest {
            line_items: vec![CheckoutLineItem {
                price: "price_1RDtLhR6UU7oxZFBNZ2Y8SF4".to_string(),
                quantity: 1,
            }],
            mode: "payment".to_string(),
            success_url: "https://shop.test/success?session_id={CHECKOUT_SESSION_ID}".to_string(),
            cancel_url: "https://shop.test/cancel".to_string(),
            shipping_address_collection: ShippingAddressCollection {
                allowed_countries: vec!["FR".to_string()],
            },
            metadata: CheckoutMetadata {
                shipping_address: "{}".to_string(),
                uploaded_files: "[]".to_string(),
            },
        };

        let json: Value = serde_json::to_value(&request).unwrap();
        assert_eq!(json["mode"], "payment");
        assert_eq!(json["line_items"][0]["quantity"], 1);
        assert_eq!(
            json["shipping_address_collection"]["allowed_countries"][0],
            "FR"
        );
        assert!(json["metadata"]["shipping_address"].is_string());
    }

    #[test]
    fn test_order_tracking_defaults() {
        let tracking: OrderTracking =
            serde_json::from_str(r#"{"order_id": 7}"#).unwrap();
        assert_eq!(tracking.status, ShipmentStatus::Pending);
        assert!(tracking.tracking_number.is_none());
    }
}
