//! Two-tier cart store.
//!
//! Local tier: the session-backed payload (authoritative while the visitor
//! browses), written through a quota-aware fallback ladder. Remote tier: the
//! signed-in user's profile row, rewritten wholesale after every mutation as
//! a best-effort backup.
//!
//! The store only ever reads the local tier; `sync` is the one exception,
//! run once per sign-in, where the remote copy wins unconditionally.

mod mirror;
mod storage;

pub use mirror::{CartMirror, ProfileMirror};
pub use storage::{CART_STORAGE_QUOTA_BYTES, CartStorage, SessionCartStorage, StorageError};

use rust_decimal::Decimal;

use starterprint_core::{CartItem, CartItemId, MAX_CART_ITEMS, PersistedCart};

use crate::supabase::SupabaseError;

/// Highest quantity a single line item supports.
pub const MAX_QUANTITY: u32 = 3;

/// Per-request cart store.
///
/// Constructed from the request session (and the user's profile mirror when
/// signed in); mutations persist locally through the fallback ladder before
/// touching the mirror, so a mirror failure never rolls back local state.
pub struct CartStore<S: CartStorage, M: CartMirror> {
    items: Vec<CartItem>,
    storage: S,
    mirror: Option<M>,
}

impl<S: CartStorage, M: CartMirror> CartStore<S, M> {
    /// Load the cart from local storage.
    ///
    /// A missing, corrupt or version-mismatched payload is an empty cart,
    /// never an error.
    pub async fn load(storage: S, mirror: Option<M>) -> Self {
        let items = match storage.read().await {
            Ok(Some(raw)) => PersistedCart::decode(&raw),
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::debug!(error = %err, "failed to read stored cart, starting empty");
                Vec::new()
            }
        };
        Self {
            items,
            storage,
            mirror,
        }
    }

    /// Current line items, oldest first.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Number of line items.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Cart total: the tier price of each item, re-derived from its current
    /// quantity rather than read from the stored `price` field.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(|item| item.tier().price()).sum()
    }

    /// Add an item.
    ///
    /// The incoming quantity is clamped to `[1, 3]` first; the form only
    /// offers those values, but the cart enforces the bound itself. An
    /// existing item with the same ID is merged: quantities are summed
    /// and clamped to the supported tiers, price fields re-derived, and an
    /// incoming file reference replaces the existing one. The list is then
    /// truncated to the most recent 3 entries.
    ///
    /// # Errors
    ///
    /// Returns the mirror failure, if any. Local state is already mutated
    /// and persisted by then.
    pub async fn add_item(&mut self, mut item: CartItem) -> Result<(), SupabaseError> {
        item.quantity = item.quantity.clamp(1, MAX_QUANTITY);
        if let Some(existing) = self.items.iter_mut().find(|i| i.id == item.id) {
            existing.quantity = (existing.quantity + item.quantity).min(MAX_QUANTITY);
            existing.apply_tier();
            if item.uploaded_file.is_some() {
                existing.uploaded_file = item.uploaded_file;
            }
        } else {
            item.apply_tier();
            self.items.push(item);
            let excess = self.items.len().saturating_sub(MAX_CART_ITEMS);
            if excess > 0 {
                self.items.drain(..excess);
            }
        }

        self.persist_local().await;
        self.mirror_save().await
    }

    /// Remove an item, deleting its uploaded file from remote storage first
    /// (best-effort; a failed delete is logged, not surfaced).
    ///
    /// # Errors
    ///
    /// Returns the mirror failure, if any.
    pub async fn remove_item(&mut self, id: CartItemId) -> Result<(), SupabaseError> {
        let file_path = self
            .items
            .iter()
            .find(|item| item.id == id)
            .and_then(|item| item.uploaded_file.as_ref())
            .map(|file| file.path.clone());

        if let (Some(path), Some(mirror)) = (file_path, &self.mirror)
            && let Err(err) = mirror.delete_file(&path).await
        {
            tracing::warn!(error = %err, path, "failed to delete uploaded file");
        }

        self.items.retain(|item| item.id != id);
        self.persist_local().await;
        self.mirror_save().await
    }

    /// Set an item's quantity. A no-op outside `[1, 3]`.
    ///
    /// # Errors
    ///
    /// Returns the mirror failure, if any.
    pub async fn update_quantity(
        &mut self,
        id: CartItemId,
        quantity: u32,
    ) -> Result<(), SupabaseError> {
        if !(1..=MAX_QUANTITY).contains(&quantity) {
            return Ok(());
        }

        if let Some(item) = self.items.iter_mut().find(|i| i.id == id) {
            item.quantity = quantity;
            item.apply_tier();
        }

        self.persist_local().await;
        self.mirror_save().await
    }

    /// Empty the cart, deleting every uploaded file from remote storage
    /// (one best-effort delete per file).
    ///
    /// # Errors
    ///
    /// Returns the mirror failure, if any.
    pub async fn clear(&mut self) -> Result<(), SupabaseError> {
        if let Some(mirror) = &self.mirror {
            for item in &self.items {
                if let Some(file) = &item.uploaded_file
                    && let Err(err) = mirror.delete_file(&file.path).await
                {
                    tracing::warn!(error = %err, path = %file.path, "failed to delete uploaded file");
                }
            }
        }

        self.items.clear();
        self.persist_local().await;
        self.mirror_save().await
    }

    /// Replace local state with the remote mirror's copy (remote wins).
    ///
    /// Runs once per sign-in. Without a mirror this is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the mirror failure, if any. Local state is untouched then.
    pub async fn sync(&mut self) -> Result<(), SupabaseError> {
        let Some(mirror) = &self.mirror else {
            return Ok(());
        };

        if let Some(remote) = mirror.load().await? {
            self.items = remote;
            self.persist_local().await;
        }
        Ok(())
    }

    /// Persist local state through the fallback ladder.
    ///
    /// Encodings are attempted in order of decreasing fidelity: full
    /// snapshots, snapshots without file references, then identifier plus
    /// quantity only. If every attempt exceeds the quota, the storage
    /// key-space is cleared and an empty cart written as a last resort.
    /// Precision is sacrificed for durability; nothing here surfaces to the
    /// caller.
    async fn persist_local(&self) {
        let attempts = [
            PersistedCart::full(&self.items),
            PersistedCart::without_files(&self.items),
            PersistedCart::minimal(&self.items),
        ];

        for (stage, payload) in attempts.iter().enumerate() {
            match self.storage.write(&payload.encode()).await {
                Ok(()) => return,
                Err(err) => {
                    tracing::debug!(stage, error = %err, "cart save attempt failed, reducing");
                }
            }
        }

        if let Err(err) = self.storage.clear_all().await {
            tracing::warn!(error = %err, "failed to clear storage after exhausted save ladder");
            return;
        }
        if let Err(err) = self.storage.write(&PersistedCart::empty().encode()).await {
            tracing::warn!(error = %err, "failed to write empty cart after storage clear");
        }
    }

    async fn mirror_save(&self) -> Result<(), SupabaseError> {
        match &self.mirror {
            Some(mirror) => mirror.save(&self.items).await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use serde_json::{Map, Value};
    use uuid::Uuid;

    use starterprint_core::{PriceTier, UploadedFile};

    // =========================================================================
    // Fakes
    // =========================================================================

    #[derive(Clone)]
    struct FakeStorage {
        inner: Arc<FakeStorageInner>,
    }

    struct FakeStorageInner {
        cell: Mutex<Option<String>>,
        quota: usize,
        cleared: AtomicBool,
    }

    impl FakeStorage {
        fn with_quota(quota: usize) -> Self {
            Self {
                inner: Arc::new(FakeStorageInner {
                    cell: Mutex::new(None),
                    quota,
                    cleared: AtomicBool::new(false),
                }),
            }
        }

        fn unlimited() -> Self {
            Self::with_quota(usize::MAX)
        }

        fn stored(&self) -> Option<String> {
            self.inner.cell.lock().unwrap().clone()
        }

        fn was_cleared(&self) -> bool {
            self.inner.cleared.load(Ordering::SeqCst)
        }
    }

    impl CartStorage for FakeStorage {
        async fn read(&self) -> Result<Option<String>, StorageError> {
            Ok(self.inner.cell.lock().unwrap().clone())
        }

        async fn write(&self, payload: &str) -> Result<(), StorageError> {
            if payload.len() > self.inner.quota {
                return Err(StorageError::QuotaExceeded {
                    size: payload.len(),
                    quota: self.inner.quota,
                });
            }
            *self.inner.cell.lock().unwrap() = Some(payload.to_string());
            Ok(())
        }

        async fn clear_all(&self) -> Result<(), StorageError> {
            self.inner.cleared.store(true, Ordering::SeqCst);
            *self.inner.cell.lock().unwrap() = None;
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct FakeMirror {
        inner: Arc<Mutex<FakeMirrorState>>,
        fail_saves: bool,
    }

    #[derive(Default)]
    struct FakeMirrorState {
        saved: Vec<Vec<CartItem>>,
        remote: Option<Vec<CartItem>>,
        deleted: Vec<String>,
    }

    impl FakeMirror {
        fn failing() -> Self {
            Self {
                fail_saves: true,
                ..Default::default()
            }
        }

        fn with_remote(items: Vec<CartItem>) -> Self {
            let mirror = Self::default();
            mirror.inner.lock().unwrap().remote = Some(items);
            mirror
        }

        fn save_count(&self) -> usize {
            self.inner.lock().unwrap().saved.len()
        }

        fn last_saved(&self) -> Option<Vec<CartItem>> {
            self.inner.lock().unwrap().saved.last().cloned()
        }

        fn deleted_paths(&self) -> Vec<String> {
            self.inner.lock().unwrap().deleted.clone()
        }
    }

    impl CartMirror for FakeMirror {
        async fn save(&self, items: &[CartItem]) -> Result<(), SupabaseError> {
            if self.fail_saves {
                return Err(SupabaseError::Api {
                    status: 503,
                    message: "unavailable".to_string(),
                });
            }
            self.inner.lock().unwrap().saved.push(items.to_vec());
            Ok(())
        }

        async fn load(&self) -> Result<Option<Vec<CartItem>>, SupabaseError> {
            Ok(self.inner.lock().unwrap().remote.clone())
        }

        async fn delete_file(&self, path: &str) -> Result<(), SupabaseError> {
            self.inner.lock().unwrap().deleted.push(path.to_string());
            Ok(())
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn form_data() -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("color".into(), Value::String("bleu".into()));
        map.insert("size".into(), Value::String("large".into()));
        map.insert("style".into(), Value::String("retro".into()));
        map
    }

    fn item(quantity: u32) -> CartItem {
        let tier = PriceTier::for_quantity(quantity);
        CartItem {
            id: CartItemId::new(Uuid::new_v4()),
            title: "Starter Pack Personnalisé".to_string(),
            image_url: String::new(),
            quantity,
            price: tier.price(),
            price_id: tier.price_id().to_string(),
            form_data: form_data(),
            uploaded_file: None,
        }
    }

    fn item_with_file(quantity: u32, path: &str) -> CartItem {
        CartItem {
            uploaded_file: Some(UploadedFile {
                path: path.to_string(),
                name: "design.png".to_string(),
                mime_type: "image/png".to_string(),
                size: 123_456,
            }),
            ..item(quantity)
        }
    }

    async fn guest_store() -> CartStore<FakeStorage, FakeMirror> {
        CartStore::load(FakeStorage::unlimited(), None).await
    }

    // =========================================================================
    // Tier pricing
    // =========================================================================

    #[tokio::test]
    async fn test_total_reflects_tier_price_per_quantity() {
        for (quantity, expected) in [(1, "29.50"), (2, "49.50"), (3, "69.50")] {
            let mut store = guest_store().await;
            store.add_item(item(quantity)).await.unwrap();
            assert_eq!(store.total().to_string(), expected);
        }
    }

    #[tokio::test]
    async fn test_add_clamps_quantity_above_three() {
        // A forged request can carry any quantity; the cart enforces the
        // bound regardless of what the form offered.
        let mut store = guest_store().await;
        store.add_item(item(9)).await.unwrap();

        let stored = &store.items()[0];
        assert_eq!(stored.quantity, 3);
        assert_eq!(stored.price_id, PriceTier::Trio.price_id());
        assert_eq!(store.total(), PriceTier::Trio.price());
    }

    #[tokio::test]
    async fn test_add_clamps_zero_quantity_to_one() {
        let mut store = guest_store().await;
        store.add_item(item(0)).await.unwrap();

        let stored = &store.items()[0];
        assert_eq!(stored.quantity, 1);
        assert_eq!(stored.price, PriceTier::Single.price());
    }

    // =========================================================================
    // Merge / cap semantics
    // =========================================================================

    #[tokio::test]
    async fn test_add_same_id_merges_and_clamps() {
        let mut store = guest_store().await;
        let first = item(1);
        let id = first.id;
        store.add_item(first).await.unwrap();

        let mut second = item(2);
        second.id = id;
        store.add_item(second).await.unwrap();

        assert_eq!(store.item_count(), 1);
        let merged = &store.items()[0];
        assert_eq!(merged.quantity, 3);
        assert_eq!(merged.price.to_string(), "69.50");
        assert_eq!(merged.price_id, PriceTier::Trio.price_id());
    }

    #[tokio::test]
    async fn test_merge_clamps_at_three() {
        let mut store = guest_store().await;
        let first = item(3);
        let id = first.id;
        store.add_item(first).await.unwrap();

        let mut second = item(2);
        second.id = id;
        store.add_item(second).await.unwrap();

        assert_eq!(store.items()[0].quantity, 3);
    }

    #[tokio::test]
    async fn test_incoming_file_overrides_existing_on_merge() {
        let mut store = guest_store().await;
        let first = item_with_file(1, "u1/old.png");
        let id = first.id;
        store.add_item(first).await.unwrap();

        let mut second = item_with_file(1, "u1/new.png");
        second.id = id;
        store.add_item(second).await.unwrap();

        let file = store.items()[0].uploaded_file.as_ref().unwrap();
        assert_eq!(file.path, "u1/new.png");

        // No incoming file keeps the existing one
        let mut third = item(1);
        third.id = id;
        store.add_item(third).await.unwrap();
        assert!(store.items()[0].uploaded_file.is_some());
    }

    #[tokio::test]
    async fn test_fourth_item_drops_oldest() {
        let mut store = guest_store().await;
        let oldest = item(1);
        let oldest_id = oldest.id;
        store.add_item(oldest).await.unwrap();
        store.add_item(item(1)).await.unwrap();
        store.add_item(item(1)).await.unwrap();
        store.add_item(item(1)).await.unwrap();

        assert_eq!(store.item_count(), 3);
        assert!(store.items().iter().all(|i| i.id != oldest_id));
    }

    // =========================================================================
    // Quantity updates
    // =========================================================================

    #[tokio::test]
    async fn test_update_quantity_rederives_price() {
        let mut store = guest_store().await;
        let it = item(1);
        let id = it.id;
        store.add_item(it).await.unwrap();

        store.update_quantity(id, 2).await.unwrap();
        assert_eq!(store.items()[0].price_id, PriceTier::Duo.price_id());
        assert_eq!(store.total().to_string(), "49.50");
    }

    #[tokio::test]
    async fn test_update_quantity_out_of_range_is_noop() {
        let mut store = guest_store().await;
        let it = item(2);
        let id = it.id;
        store.add_item(it).await.unwrap();
        let before = store.items().to_vec();

        store.update_quantity(id, 0).await.unwrap();
        assert_eq!(store.items(), before.as_slice());

        store.update_quantity(id, 4).await.unwrap();
        assert_eq!(store.items(), before.as_slice());
    }

    // =========================================================================
    // Persistence ladder
    // =========================================================================

    #[tokio::test]
    async fn test_persist_restore_roundtrip() {
        let storage = FakeStorage::unlimited();
        let mut store: CartStore<FakeStorage, FakeMirror> =
            CartStore::load(storage.clone(), None).await;
        for q in 1..=3 {
            store
                .add_item(item_with_file(q, &format!("u1/design-{q}.png")))
                .await
                .unwrap();
        }
        let saved: Vec<_> = store
            .items()
            .iter()
            .map(|i| (i.id, i.quantity))
            .collect();

        let reloaded: CartStore<FakeStorage, FakeMirror> = CartStore::load(storage, None).await;
        let restored: Vec<_> = reloaded
            .items()
            .iter()
            .map(|i| (i.id, i.quantity))
            .collect();
        assert_eq!(restored, saved);

        for restored_item in reloaded.items() {
            assert_eq!(restored_item.form_value("color"), Some("bleu"));
            assert_eq!(restored_item.form_value("size"), Some("large"));
            assert_eq!(restored_item.form_value("style"), Some("retro"));
            assert!(restored_item.uploaded_file.is_some());
        }
    }

    #[tokio::test]
    async fn test_quota_failure_falls_back_to_reduced_encoding() {
        // Full encoding with three file-carrying items exceeds this quota;
        // the no-files encoding fits.
        let storage = FakeStorage::with_quota(450);
        let mut store: CartStore<FakeStorage, FakeMirror> =
            CartStore::load(storage.clone(), None).await;
        for q in 1..=3 {
            store
                .add_item(item_with_file(q, &format!("u1/design-{q}.png")))
                .await
                .unwrap();
        }

        let stored = storage.stored().expect("cart must be persisted");
        assert!(stored.len() <= 450);
        assert!(!stored.contains("design-1.png"));

        // The cart survives a reload, minus the dropped file references
        let reloaded: CartStore<FakeStorage, FakeMirror> = CartStore::load(storage, None).await;
        assert_eq!(reloaded.item_count(), 3);
    }

    #[tokio::test]
    async fn test_exhausted_ladder_clears_storage_and_writes_empty() {
        // Too small for any item-bearing encoding, big enough for the empty
        // payload.
        let storage = FakeStorage::with_quota(40);
        let mut store: CartStore<FakeStorage, FakeMirror> =
            CartStore::load(storage.clone(), None).await;
        store.add_item(item(1)).await.unwrap();

        assert!(storage.was_cleared());
        let stored = storage.stored().expect("empty cart must be written");
        assert_eq!(stored, r#"{"state":{"items":[]},"version":1}"#);
    }

    #[tokio::test]
    async fn test_corrupt_stored_payload_loads_as_empty() {
        let storage = FakeStorage::unlimited();
        storage.write("{definitely not json").await.unwrap();

        let store: CartStore<FakeStorage, FakeMirror> = CartStore::load(storage, None).await;
        assert_eq!(store.item_count(), 0);
    }

    // =========================================================================
    // Remote mirror
    // =========================================================================

    #[tokio::test]
    async fn test_mutations_rewrite_mirror_wholesale() {
        let mirror = FakeMirror::default();
        let mut store = CartStore::load(FakeStorage::unlimited(), Some(mirror.clone())).await;

        let it = item(1);
        let id = it.id;
        store.add_item(it).await.unwrap();
        store.update_quantity(id, 2).await.unwrap();
        store.remove_item(id).await.unwrap();

        assert_eq!(mirror.save_count(), 3);
        assert!(mirror.last_saved().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mirror_failure_bubbles_but_keeps_local_state() {
        let storage = FakeStorage::unlimited();
        let mut store = CartStore::load(storage.clone(), Some(FakeMirror::failing())).await;

        let result = store.add_item(item(1)).await;
        assert!(result.is_err());
        assert_eq!(store.item_count(), 1);
        assert!(storage.stored().is_some());
    }

    #[tokio::test]
    async fn test_remove_item_deletes_its_file() {
        let mirror = FakeMirror::default();
        let mut store = CartStore::load(FakeStorage::unlimited(), Some(mirror.clone())).await;

        let it = item_with_file(1, "u1/design.png");
        let id = it.id;
        store.add_item(it).await.unwrap();
        store.remove_item(id).await.unwrap();

        assert_eq!(mirror.deleted_paths(), vec!["u1/design.png".to_string()]);
        assert_eq!(store.item_count(), 0);
    }

    #[tokio::test]
    async fn test_clear_deletes_one_file_per_item() {
        let mirror = FakeMirror::default();
        let mut store = CartStore::load(FakeStorage::unlimited(), Some(mirror.clone())).await;

        store.add_item(item_with_file(1, "u1/a.png")).await.unwrap();
        store.add_item(item_with_file(1, "u1/b.png")).await.unwrap();
        store.add_item(item(1)).await.unwrap();
        store.clear().await.unwrap();

        assert_eq!(store.item_count(), 0);
        assert_eq!(
            mirror.deleted_paths(),
            vec!["u1/a.png".to_string(), "u1/b.png".to_string()]
        );
    }

    #[tokio::test]
    async fn test_sync_remote_wins() {
        let remote_items = vec![item(2), item(3)];
        let mirror = FakeMirror::with_remote(remote_items.clone());
        let storage = FakeStorage::unlimited();
        let mut store = CartStore::load(storage.clone(), Some(mirror)).await;
        store.add_item(item(1)).await.unwrap();

        store.sync().await.unwrap();

        assert_eq!(store.item_count(), 2);
        assert_eq!(store.items()[0].id, remote_items[0].id);
        // The synced cart is persisted locally too
        let reloaded: CartStore<FakeStorage, FakeMirror> = CartStore::load(storage, None).await;
        assert_eq!(reloaded.item_count(), 2);
    }

    #[tokio::test]
    async fn test_sync_without_remote_cart_keeps_local() {
        let mirror = FakeMirror::default();
        let mut store = CartStore::load(FakeStorage::unlimited(), Some(mirror)).await;
        store.add_item(item(1)).await.unwrap();

        store.sync().await.unwrap();
        assert_eq!(store.item_count(), 1);
    }
}
