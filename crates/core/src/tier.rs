//! The fixed price-tier table for the starter pack product.
//!
//! There is exactly one product, sold in 1/2/3-unit packs. Each pack size
//! maps to its own payment-processor price object; the unit prices and
//! price identifiers are business constants, never computed.

use rust_decimal::Decimal;

/// One of the three fixed (quantity, price, price identifier) combinations.
///
/// Quantities outside 1-3 fall back to the single-unit tier, mirroring the
/// checkout configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceTier {
    /// 1-unit pack.
    Single,
    /// Discounted 2-unit pack.
    Duo,
    /// Discounted 3-unit pack.
    Trio,
}

impl PriceTier {
    /// Resolve the tier for a quantity. Anything outside {1,2,3} maps to
    /// the single-unit tier.
    #[must_use]
    pub const fn for_quantity(quantity: u32) -> Self {
        match quantity {
            3 => Self::Trio,
            2 => Self::Duo,
            _ => Self::Single,
        }
    }

    /// Payment-processor price identifier for this tier.
    #[must_use]
    pub const fn price_id(&self) -> &'static str {
        match self {
            Self::Single => "price_1RDtLhR6UU7oxZFBNZ2Y8SF4",
            Self::Duo => "price_1RE9E3R6UU7oxZFBy3Ured1g",
            Self::Trio => "price_1RE9GBR6UU7oxZFBIA1KsRPt",
        }
    }

    /// Display name of the pack.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Single => "Starter Pack x 1 ex.",
            Self::Duo => "Starter Pack x 2 ex.",
            Self::Trio => "Starter Pack x 3 ex.",
        }
    }

    /// French product description.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Single => "Pack de démarrage pour l'impression 3D - 1 exemplaire",
            Self::Duo => "Pack de démarrage pour l'impression 3D - 2 exemplaires",
            Self::Trio => "Pack de démarrage pour l'impression 3D - 3 exemplaires",
        }
    }

    /// Pack price in euros. This is the price for the whole pack, not per
    /// unit - the 2- and 3-packs are discounted.
    #[must_use]
    pub fn price(&self) -> Decimal {
        match self {
            Self::Single => Decimal::new(29_50, 2),
            Self::Duo => Decimal::new(49_50, 2),
            Self::Trio => Decimal::new(69_50, 2),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_for_quantity() {
        assert_eq!(PriceTier::for_quantity(1), PriceTier::Single);
        assert_eq!(PriceTier::for_quantity(2), PriceTier::Duo);
        assert_eq!(PriceTier::for_quantity(3), PriceTier::Trio);
    }

    #[test]
    fn test_out_of_range_defaults_to_single() {
        assert_eq!(PriceTier::for_quantity(0), PriceTier::Single);
        assert_eq!(PriceTier::for_quantity(4), PriceTier::Single);
        assert_eq!(PriceTier::for_quantity(100), PriceTier::Single);
    }

    #[test]
    fn test_business_constants() {
        assert_eq!(PriceTier::Single.price(), Decimal::new(2950, 2));
        assert_eq!(PriceTier::Duo.price(), Decimal::new(4950, 2));
        assert_eq!(PriceTier::Trio.price(), Decimal::new(6950, 2));
        assert_eq!(
            PriceTier::Trio.price_id(),
            "price_1RE9GBR6UU7oxZFBIA1KsRPt"
        );
        assert_eq!(PriceTier::Single.name(), "Starter Pack x 1 ex.");
    }
}
