//! Wire types for the admin Supabase surfaces.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use starterprint_core::{Email, OrderId, ShipmentStatus, UserId};

/// Authenticated user object returned by GoTrue.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    pub email: Email,
}

/// A GoTrue session: tokens plus the user they belong to.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub user: AuthUser,
}

/// One row of the `admin_customers` view.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminCustomer {
    pub user_id: UserId,
    pub email: Email,
    pub stripe_customer_id: Option<String>,
    pub total_orders: i64,
    /// Lifetime spend in minor currency units (euro cents).
    pub total_spent: i64,
    pub last_order_date: Option<DateTime<Utc>>,
}

impl AdminCustomer {
    /// Lifetime spend in major units (euros).
    #[must_use]
    pub fn total_spent_major(&self) -> Decimal {
        Decimal::new(self.total_spent, 2)
    }
}

/// One row of the `admin_orders` view.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminOrder {
    #[serde(rename = "id")]
    pub order_id: OrderId,
    pub checkout_session_id: String,
    pub customer_email: Option<Email>,
    pub order_date: DateTime<Utc>,
    /// Amount paid in minor currency units (euro cents).
    pub amount_total: i64,
    pub currency: String,
    pub order_status: Option<String>,
    /// File descriptors recorded by the payment webhook, one entry per
    /// line item (null for file-less items).
    pub uploaded_files: Option<Value>,
}

impl AdminOrder {
    /// Amount paid in major units (euros).
    #[must_use]
    pub fn amount_total_major(&self) -> Decimal {
        Decimal::new(self.amount_total, 2)
    }
}

/// One row of `order_tracking`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderTracking {
    pub order_id: OrderId,
    #[serde(default)]
    pub status: ShipmentStatus,
    pub tracking_number: Option<String>,
    pub carrier: Option<String>,
    pub estimated_delivery: Option<NaiveDate>,
}

/// Tracking fields written when an order ships.
#[derive(Debug, Clone, Serialize)]
pub struct TrackingUpdate {
    pub tracking_number: String,
    pub carrier: String,
    pub estimated_delivery: Option<NaiveDate>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_amounts_convert_from_minor_units() {
        let json = serde_json::json!({
            "id": 42,
            "checkout_session_id": "cs_test_123",
            "customer_email": "jean@example.com",
            "order_date": "2026-08-01T10:00:00Z",
            "amount_total": 6950,
            "currency": "eur",
            "order_status": "completed",
            "uploaded_files": null,
        });

        let order: AdminOrder = serde_json::from_value(json).unwrap();
        assert_eq!(order.amount_total_major().to_string(), "69.50");
    }

    #[test]
    fn test_customer_row_deserializes() {
        let json = serde_json::json!({
            "user_id": "7d444840-9dc0-11d1-b245-5ffdce74fad2",
            "email": "jean@example.com",
            "stripe_customer_id": "cus_123",
            "total_orders": 3,
            "total_spent": 14850,
            "last_order_date": "2026-08-01T10:00:00Z",
        });

        let customer: AdminCustomer = serde_json::from_value(json).unwrap();
        assert_eq!(customer.total_orders, 3);
        assert_eq!(customer.total_spent_major().to_string(), "148.50");
    }
}
