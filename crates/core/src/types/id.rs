//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_uuid_id!` macro to create type-safe UUID wrappers that
//! prevent accidentally mixing IDs from different entity types. Order ids
//! are the one exception: the remote orders table uses a bigint key, so
//! [`OrderId`] wraps an `i64`.

use serde::{Deserialize, Serialize};

/// Macro to define a type-safe UUID-backed ID wrapper.
///
/// Creates a newtype wrapper around [`uuid::Uuid`] with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_uuid()`
/// - `From<Uuid>` and `Into<Uuid>` implementations
/// - `FromStr` delegating to UUID parsing
///
/// # Example
///
/// ```rust
/// # use starterprint_core::define_uuid_id;
/// define_uuid_id!(WidgetId);
///
/// let id = WidgetId::new(uuid::Uuid::new_v4());
/// let _: uuid::Uuid = id.into();
/// ```
#[macro_export]
macro_rules! define_uuid_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(::uuid::Uuid);

        impl $name {
            /// Create a new ID from a UUID value.
            #[must_use]
            pub const fn new(id: ::uuid::Uuid) -> Self {
                Self(id)
            }

            /// Get the underlying UUID value.
            #[must_use]
            pub const fn as_uuid(&self) -> ::uuid::Uuid {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::uuid::Error;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }

        impl From<::uuid::Uuid> for $name {
            fn from(id: ::uuid::Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for ::uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Define standard entity IDs
define_uuid_id!(UserId);
define_uuid_id!(CartItemId);

/// Identifier of an order row in the remote orders table.
///
/// Orders use a bigint primary key rather than a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(i64);

impl OrderId {
    /// Create a new order ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the underlying i64 value.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for OrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for OrderId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<OrderId> for i64 {
    fn from(id: OrderId) -> Self {
        id.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_id_roundtrip() {
        let raw = uuid::Uuid::new_v4();
        let id = UserId::new(raw);
        assert_eq!(id.as_uuid(), raw);
        assert_eq!(id.to_string(), raw.to_string());
    }

    #[test]
    fn test_uuid_id_parse() {
        let id: UserId = "c56a4180-65aa-42ec-a945-5fd21dec0538".parse().unwrap();
        assert_eq!(id.to_string(), "c56a4180-65aa-42ec-a945-5fd21dec0538");
        assert!("not-a-uuid".parse::<UserId>().is_err());
    }

    #[test]
    fn test_uuid_id_serde_transparent() {
        let id = CartItemId::new(uuid::Uuid::nil());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000000\"");
    }

    #[test]
    fn test_order_id() {
        let id = OrderId::new(42);
        assert_eq!(id.as_i64(), 42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
    }
}
