//! Shipment status for order tracking.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Shipment status of an order.
///
/// A free-form progression field - the back-office may set any value at any
/// time, there is no transition validation (an order can go from `Delivered`
/// back to `Pending` if an admin says so).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShipmentStatus {
    /// Order received, nothing printed yet.
    #[default]
    Pending,
    /// In production.
    Processing,
    /// Handed to the carrier.
    Shipped,
    /// Confirmed delivered.
    Delivered,
    /// Returned to sender.
    Returned,
}

impl ShipmentStatus {
    /// All statuses, in display order (for admin select inputs).
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Returned,
    ];

    /// The wire representation used by the remote tracking table.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Returned => "returned",
        }
    }

    /// French display label (the storefront is French-language).
    #[must_use]
    pub const fn label_fr(&self) -> &'static str {
        match self {
            Self::Pending => "En attente",
            Self::Processing => "En préparation",
            Self::Shipped => "Expédiée",
            Self::Delivered => "Livrée",
            Self::Returned => "Retournée",
        }
    }

    /// Parse a wire value, falling back to `Pending` for anything unknown.
    ///
    /// The tracking table is written by several tools; unknown values are
    /// displayed as pending rather than rejected.
    #[must_use]
    pub fn parse_lossy(s: &str) -> Self {
        match s {
            "processing" => Self::Processing,
            "shipped" => Self::Shipped,
            "delivered" => Self::Delivered,
            "returned" => Self::Returned,
            _ => Self::Pending,
        }
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_roundtrip() {
        for status in ShipmentStatus::ALL {
            assert_eq!(ShipmentStatus::parse_lossy(status.as_str()), status);
        }
    }

    #[test]
    fn test_unknown_is_pending() {
        assert_eq!(
            ShipmentStatus::parse_lossy("teleported"),
            ShipmentStatus::Pending
        );
        assert_eq!(ShipmentStatus::parse_lossy(""), ShipmentStatus::Pending);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&ShipmentStatus::Shipped).unwrap();
        assert_eq!(json, "\"shipped\"");
        let back: ShipmentStatus = serde_json::from_str("\"delivered\"").unwrap();
        assert_eq!(back, ShipmentStatus::Delivered);
    }
}
