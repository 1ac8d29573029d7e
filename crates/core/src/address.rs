//! Shipping addresses.

use serde::{Deserialize, Serialize};

/// Errors produced by [`ShippingAddress::validate`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// A required field is empty.
    #[error("champ requis manquant : {0}")]
    MissingField(&'static str),
}

/// A postal shipping address.
///
/// Owned by the remote user profile (one per authenticated identity) and
/// echoed into each order's checkout metadata. Field names match the wire
/// representation stored in the profile record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    /// Optional company name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    /// Primary address line (required).
    pub line1: String,
    /// Secondary address line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    /// Postal code (required).
    pub postal_code: String,
    /// City (required).
    pub city: String,
    /// ISO country code (required). Shipping is currently France-only.
    pub country: String,
}

impl ShippingAddress {
    /// Validate that required fields are present.
    ///
    /// Called before any network call so validation failures surface inline
    /// rather than as remote errors.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::MissingField`] naming the first empty
    /// required field.
    pub fn validate(&self) -> Result<(), AddressError> {
        if self.line1.trim().is_empty() {
            return Err(AddressError::MissingField("adresse"));
        }
        if self.postal_code.trim().is_empty() {
            return Err(AddressError::MissingField("code postal"));
        }
        if self.city.trim().is_empty() {
            return Err(AddressError::MissingField("ville"));
        }
        if self.country.trim().is_empty() {
            return Err(AddressError::MissingField("pays"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn address() -> ShippingAddress {
        ShippingAddress {
            company_name: None,
            line1: "12 rue de la Paix".to_string(),
            line2: None,
            postal_code: "75002".to_string(),
            city: "Paris".to_string(),
            country: "FR".to_string(),
        }
    }

    #[test]
    fn test_valid_address() {
        assert!(address().validate().is_ok());
    }

    #[test]
    fn test_missing_required_fields() {
        let mut a = address();
        a.line1 = "  ".to_string();
        assert_eq!(a.validate(), Err(AddressError::MissingField("adresse")));

        let mut a = address();
        a.city = String::new();
        assert_eq!(a.validate(), Err(AddressError::MissingField("ville")));
    }

    #[test]
    fn test_optional_fields_skipped_on_wire() {
        let json = serde_json::to_string(&address()).unwrap();
        assert!(!json.contains("company_name"));
        assert!(!json.contains("line2"));
    }
}
