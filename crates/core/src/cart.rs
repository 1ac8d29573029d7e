//! Cart line items and their storage-reduced snapshots.
//!
//! Two representations exist:
//!
//! - [`CartItem`] - the full in-memory line item the storefront works with.
//! - [`CartSnapshot`] - the reduced projection persisted to the local cart
//!   key. Local storage has a small per-key byte budget, so the snapshot
//!   keeps only what cannot be re-derived: identifier, quantity, three
//!   known form-data keys, and a trimmed file reference. Price, price
//!   identifier and title are re-derived from quantity at load time via
//!   [`PriceTier`].
//!
//! [`PersistedCart`] is the on-disk envelope: `{ state: { items }, version }`.
//! It offers three encodings of decreasing size (full / no files / minimal)
//! which the storefront's save ladder tries in order when the byte budget
//! is exceeded.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::tier::PriceTier;
use crate::types::CartItemId;

/// Maximum number of line items a cart retains; oldest items are dropped
/// first when exceeded.
pub const MAX_CART_ITEMS: usize = 3;

/// Version of the persisted cart payload. A stored payload with any other
/// version is treated as "no cart".
pub const CART_SCHEMA_VERSION: u32 = 1;

/// Reference to a customer-uploaded design file in remote object storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Object path inside the upload bucket (`{user_id}/{uuid}.{ext}`).
    pub path: String,
    /// Original filename as uploaded.
    pub name: String,
    /// MIME type reported at upload time.
    #[serde(rename = "type", default)]
    pub mime_type: String,
    /// Byte size reported at upload time.
    #[serde(default)]
    pub size: u64,
}

/// A cart line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Stable line-item identifier, generated when the customization is
    /// finalized.
    pub id: CartItemId,
    /// Display title.
    pub title: String,
    /// Preview image URL (may be empty after a restore).
    #[serde(default)]
    pub image_url: String,
    /// Pack quantity, 1-3.
    pub quantity: u32,
    /// Pack price. Always a derived function of `quantity`, never set
    /// independently.
    pub price: Decimal,
    /// Payment-processor price identifier. Derived alongside `price`.
    pub price_id: String,
    /// Customization answers (free-form).
    #[serde(default)]
    pub form_data: Map<String, Value>,
    /// Uploaded design file, if the customer finished the upload step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_file: Option<UploadedFile>,
}

impl CartItem {
    /// The price tier this item's quantity resolves to.
    #[must_use]
    pub const fn tier(&self) -> PriceTier {
        PriceTier::for_quantity(self.quantity)
    }

    /// Re-derive `price` and `price_id` from the current quantity.
    ///
    /// Called after every quantity change; the stored price is a cache of
    /// the tier lookup, never an input.
    pub fn apply_tier(&mut self) {
        let tier = self.tier();
        self.price = tier.price();
        self.price_id = tier.price_id().to_string();
    }

    /// A string-valued form-data entry, if present.
    #[must_use]
    pub fn form_value(&self, key: &str) -> Option<&str> {
        self.form_data.get(key).and_then(Value::as_str)
    }
}

/// The three form-data keys retained by snapshots, with their restore
/// defaults.
const SNAPSHOT_FORM_KEYS: [(&str, &str); 3] = [
    ("color", "default"),
    ("size", "medium"),
    ("style", "classic"),
];

/// Snapshot of a form-data mapping: only the three known keys survive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotFormData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

impl SnapshotFormData {
    fn trim(form_data: &Map<String, Value>) -> Self {
        let get = |key: &str| {
            form_data
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_owned)
        };
        Self {
            color: get("color"),
            size: get("size"),
            style: get("style"),
        }
    }

    /// Expand back into a form-data map, filling defaults for absent keys.
    fn restore(&self) -> Map<String, Value> {
        let stored = [&self.color, &self.size, &self.style];
        let mut map = Map::new();
        for ((key, default), value) in SNAPSHOT_FORM_KEYS.iter().zip(stored) {
            let value = value.as_deref().unwrap_or(default);
            map.insert((*key).to_string(), Value::String(value.to_string()));
        }
        map
    }
}

/// Trimmed uploaded-file reference: path and name only. MIME type and size
/// are dropped to save space and zeroed on restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotFile {
    pub path: String,
    pub name: String,
}

impl From<&UploadedFile> for SnapshotFile {
    fn from(file: &UploadedFile) -> Self {
        Self {
            path: file.path.clone(),
            name: file.name.clone(),
        }
    }
}

impl From<SnapshotFile> for UploadedFile {
    fn from(file: SnapshotFile) -> Self {
        Self {
            path: file.path,
            name: file.name,
            mime_type: String::new(),
            size: 0,
        }
    }
}

/// The storage-reduced projection of a [`CartItem`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub id: CartItemId,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_data: Option<SnapshotFormData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_file: Option<SnapshotFile>,
}

impl From<&CartItem> for CartSnapshot {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id,
            quantity: item.quantity,
            form_data: Some(SnapshotFormData::trim(&item.form_data)),
            uploaded_file: item.uploaded_file.as_ref().map(SnapshotFile::from),
        }
    }
}

impl CartSnapshot {
    /// Reconstruct a full [`CartItem`] from this snapshot.
    ///
    /// Price, price identifier and title are re-derived from the quantity
    /// via the fixed tier table; missing form-data keys get their defaults.
    #[must_use]
    pub fn restore(&self) -> CartItem {
        let tier = PriceTier::for_quantity(self.quantity);
        CartItem {
            id: self.id,
            title: tier.name().to_string(),
            image_url: String::new(),
            quantity: self.quantity,
            price: tier.price(),
            price_id: tier.price_id().to_string(),
            form_data: self.form_data.clone().unwrap_or_default().restore(),
            uploaded_file: self.uploaded_file.clone().map(UploadedFile::from),
        }
    }

    fn without_file(mut self) -> Self {
        self.uploaded_file = None;
        self
    }

    const fn minimal(id: CartItemId, quantity: u32) -> Self {
        Self {
            id,
            quantity,
            form_data: None,
            uploaded_file: None,
        }
    }
}

/// Persisted cart state: `{ state: { items: [...] } }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub items: Vec<CartSnapshot>,
}

/// The single local-storage payload: persisted state plus schema version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedCart {
    pub state: PersistedState,
    pub version: u32,
}

const EMPTY_CART_JSON: &str = r#"{"state":{"items":[]},"version":1}"#;

impl PersistedCart {
    fn from_snapshots(items: Vec<CartSnapshot>) -> Self {
        Self {
            state: PersistedState { items },
            version: CART_SCHEMA_VERSION,
        }
    }

    /// Full snapshot encoding: three known form keys plus trimmed file
    /// references, capped to the most recent [`MAX_CART_ITEMS`] items.
    #[must_use]
    pub fn full(items: &[CartItem]) -> Self {
        Self::from_snapshots(capped(items).map(CartSnapshot::from).collect())
    }

    /// Like [`Self::full`], but with every uploaded-file reference dropped.
    #[must_use]
    pub fn without_files(items: &[CartItem]) -> Self {
        Self::from_snapshots(
            capped(items)
                .map(|item| CartSnapshot::from(item).without_file())
                .collect(),
        )
    }

    /// Absolute minimum: identifier and quantity only.
    #[must_use]
    pub fn minimal(items: &[CartItem]) -> Self {
        Self::from_snapshots(
            capped(items)
                .map(|item| CartSnapshot::minimal(item.id, item.quantity))
                .collect(),
        )
    }

    /// An empty cart payload, used as the last-resort write after a full
    /// storage clear.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_snapshots(Vec::new())
    }

    /// Serialize to the stored JSON form.
    #[must_use]
    pub fn encode(&self) -> String {
        // Plain data with string keys throughout; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| EMPTY_CART_JSON.to_string())
    }

    /// Parse a stored payload and restore full items.
    ///
    /// A corrupt value, a missing key, or an unknown schema version is
    /// treated as "no cart", never as a fatal error.
    #[must_use]
    pub fn decode(raw: &str) -> Vec<CartItem> {
        let Ok(persisted) = serde_json::from_str::<Self>(raw) else {
            return Vec::new();
        };
        if persisted.version != CART_SCHEMA_VERSION {
            return Vec::new();
        }
        persisted
            .state
            .items
            .iter()
            .map(CartSnapshot::restore)
            .collect()
    }
}

/// Iterate the most recent [`MAX_CART_ITEMS`] items, oldest first.
fn capped(items: &[CartItem]) -> impl Iterator<Item = &CartItem> {
    let start = items.len().saturating_sub(MAX_CART_ITEMS);
    items.iter().skip(start)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn item(quantity: u32) -> CartItem {
        let mut form_data = Map::new();
        form_data.insert("color".into(), Value::String("bleu".into()));
        form_data.insert("size".into(), Value::String("large".into()));
        form_data.insert("style".into(), Value::String("retro".into()));
        form_data.insert("title".into(), Value::String("SUPER DEV".into()));

        let tier = PriceTier::for_quantity(quantity);
        CartItem {
            id: CartItemId::new(Uuid::new_v4()),
            title: "Starter Pack Personnalisé".to_string(),
            image_url: "data:image/png;base64,xyz".to_string(),
            quantity,
            price: tier.price(),
            price_id: tier.price_id().to_string(),
            form_data,
            uploaded_file: Some(UploadedFile {
                path: "user-1/design.png".to_string(),
                name: "design.png".to_string(),
                mime_type: "image/png".to_string(),
                size: 123_456,
            }),
        }
    }

    #[test]
    fn test_apply_tier_rederives_price() {
        let mut it = item(1);
        it.quantity = 3;
        it.apply_tier();
        assert_eq!(it.price, PriceTier::Trio.price());
        assert_eq!(it.price_id, PriceTier::Trio.price_id());
    }

    #[test]
    fn test_persist_restore_roundtrip() {
        let items = vec![item(1), item(2), item(3)];
        let restored = PersistedCart::decode(&PersistedCart::full(&items).encode());

        assert_eq!(restored.len(), 3);
        for (orig, back) in items.iter().zip(&restored) {
            assert_eq!(back.id, orig.id);
            assert_eq!(back.quantity, orig.quantity);
            // Known form keys survive; the rest is trimmed away
            assert_eq!(back.form_value("color"), Some("bleu"));
            assert_eq!(back.form_value("size"), Some("large"));
            assert_eq!(back.form_value("style"), Some("retro"));
            assert_eq!(back.form_value("title"), None);
            // Price fields are re-derived, not round-tripped
            assert_eq!(back.price, orig.tier().price());
            assert_eq!(back.price_id, orig.price_id);
            // File reference keeps path + name only
            let file = back.uploaded_file.as_ref().unwrap();
            assert_eq!(file.path, "user-1/design.png");
            assert_eq!(file.name, "design.png");
            assert!(file.mime_type.is_empty());
        }
    }

    #[test]
    fn test_restore_defaults_for_missing_form_keys() {
        let snapshot = CartSnapshot::minimal(CartItemId::new(Uuid::new_v4()), 2);
        let restored = snapshot.restore();
        assert_eq!(restored.form_value("color"), Some("default"));
        assert_eq!(restored.form_value("size"), Some("medium"));
        assert_eq!(restored.form_value("style"), Some("classic"));
        assert_eq!(restored.title, "Starter Pack x 2 ex.");
    }

    #[test]
    fn test_encodings_shrink() {
        let items = vec![item(1), item(2), item(3)];
        let full = PersistedCart::full(&items).encode();
        let no_files = PersistedCart::without_files(&items).encode();
        let minimal = PersistedCart::minimal(&items).encode();
        assert!(no_files.len() < full.len());
        assert!(minimal.len() < no_files.len());
    }

    #[test]
    fn test_encode_caps_to_three_most_recent() {
        let items = vec![item(1), item(1), item(2), item(3)];
        let persisted = PersistedCart::full(&items);
        assert_eq!(persisted.state.items.len(), MAX_CART_ITEMS);
        assert_eq!(persisted.state.items[0].id, items[1].id);
    }

    #[test]
    fn test_decode_corrupt_is_empty_cart() {
        assert!(PersistedCart::decode("").is_empty());
        assert!(PersistedCart::decode("{not json").is_empty());
        assert!(PersistedCart::decode("{\"state\":42}").is_empty());
    }

    #[test]
    fn test_decode_unknown_version_is_empty_cart() {
        let raw = r#"{"state":{"items":[{"id":"c56a4180-65aa-42ec-a945-5fd21dec0538","quantity":2}]},"version":2}"#;
        assert!(PersistedCart::decode(raw).is_empty());
    }

    #[test]
    fn test_empty_constant_matches_encoder() {
        assert_eq!(PersistedCart::empty().encode(), EMPTY_CART_JSON);
    }
}
