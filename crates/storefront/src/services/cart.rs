//! Cart store: the in-session cart mirrored to durable storage.
//!
//! The store has two states. A [`CartLoader`] is a store that has not read its
//! snapshot yet and exposes nothing but [`CartLoader::initialize`]; that call
//! consumes it and returns the [`CartStore`], which is the only type with
//! mutation methods. A freshly created, still-empty cart therefore cannot
//! overwrite a snapshot that has not been loaded.
//!
//! ```rust
//! use bistro_core::{CartItem, ProductId};
//! use bistro_storefront::services::cart::CartLoader;
//! use bistro_storefront::storage::MemoryStorage;
//! use rust_decimal::Decimal;
//!
//! let mut storage = MemoryStorage::new();
//! let mut cart = CartLoader::new(&mut storage).initialize();
//! cart.add_item(CartItem::new("p1", "Pretzel", Decimal::new(29, 0), 1));
//! cart.add_item(CartItem::new("p1", "ignored", Decimal::new(99, 0), 2));
//!
//! assert_eq!(cart.total_item_count(), 3);
//! assert_eq!(cart.total_price(), Decimal::new(87, 0));
//! ```

use bistro_core::{Cart, CartItem, ProductId};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::storage::SnapshotStorage;

/// Storage key the cart snapshot lives under.
pub const CART_SNAPSHOT_KEY: &str = "bistro.cart";

/// A cart store that has not loaded its snapshot yet.
#[derive(Debug)]
pub struct CartLoader<S> {
    storage: S,
    key: String,
}

impl<S: SnapshotStorage> CartLoader<S> {
    /// Create a loader using the default snapshot key.
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, CART_SNAPSHOT_KEY)
    }

    /// Create a loader using a custom snapshot key.
    #[must_use]
    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Load the persisted snapshot and hand back the usable store.
    ///
    /// Never fails: a missing snapshot yields an empty cart, and a corrupt one
    /// is removed from storage and replaced by an empty cart. A snapshot that
    /// parses but breaks the cart invariants is repaired and written back.
    #[must_use]
    pub fn initialize(mut self) -> CartStore<S> {
        let cart = match self.storage.read(&self.key) {
            Ok(Some(snapshot)) => match Cart::from_snapshot(&snapshot) {
                Ok((cart, report)) if report.is_clean() => cart,
                Ok((cart, report)) => {
                    warn!(
                        key = %self.key,
                        merged_duplicates = report.merged_duplicates,
                        dropped_empty = report.dropped_empty,
                        dropped_invalid = report.dropped_invalid,
                        "Repaired cart snapshot"
                    );
                    write_snapshot(&mut self.storage, &self.key, &cart);
                    cart
                }
                Err(e) => {
                    warn!(key = %self.key, error = %e, "Discarding corrupt cart snapshot");
                    if let Err(e) = self.storage.remove(&self.key) {
                        warn!(key = %self.key, error = %e, "Failed to remove corrupt cart snapshot");
                    }
                    Cart::new()
                }
            },
            Ok(None) => Cart::new(),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read cart snapshot, starting empty");
                Cart::new()
            }
        };

        debug!(key = %self.key, lines = cart.line_count(), "Cart initialized");

        CartStore {
            storage: self.storage,
            key: self.key,
            cart,
        }
    }
}

/// An initialized cart store.
///
/// Every mutation writes the full snapshot back to storage before returning.
/// Storage failures are logged and swallowed; the in-memory cart stays
/// authoritative for the rest of the session.
#[derive(Debug)]
pub struct CartStore<S> {
    storage: S,
    key: String,
    cart: Cart,
}

impl<S: SnapshotStorage> CartStore<S> {
    /// Add an item, merging quantities into an existing line with the same id.
    ///
    /// The existing line keeps its title, prices and other metadata. An item
    /// that fails [`CartItem::validate`] is logged and ignored.
    pub fn add_item(&mut self, item: CartItem) {
        if let Err(e) = item.validate() {
            warn!(product_id = %item.id, error = %e, "Ignoring item that cannot enter the cart");
            return;
        }
        self.cart.add_item(item);
        self.persist();
    }

    /// Remove the line with `id`; does nothing if it is absent.
    pub fn remove_item(&mut self, id: &ProductId) {
        self.cart.remove_item(id);
        self.persist();
    }

    /// Set a line's quantity. Zero or negative removes the line.
    pub fn update_quantity(&mut self, id: &ProductId, quantity: i64) {
        self.cart.update_quantity(id, quantity);
        self.persist();
    }

    /// Empty the cart and delete the durable snapshot.
    pub fn clear_cart(&mut self) {
        self.cart.clear();
        if let Err(e) = self.storage.remove(&self.key) {
            warn!(key = %self.key, error = %e, "Failed to remove cart snapshot");
        }
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_item_count(&self) -> u64 {
        self.cart.total_item_count()
    }

    /// Sum of effective price times quantity, unrounded.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.cart.total_price()
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        self.cart.items()
    }

    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartItem> {
        self.cart.get(id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    /// Read-only view of the underlying aggregate.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    fn persist(&mut self) {
        write_snapshot(&mut self.storage, &self.key, &self.cart);
    }
}

fn write_snapshot<S: SnapshotStorage>(storage: &mut S, key: &str, cart: &Cart) {
    let snapshot = match cart.to_snapshot() {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(key, error = %e, "Failed to serialize cart snapshot");
            return;
        }
    };
    if let Err(e) = storage.write(key, &snapshot) {
        warn!(key, error = %e, "Failed to persist cart snapshot");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::{FileStorage, MemoryStorage};

    fn item(id: &str, price: i64, quantity: u32) -> CartItem {
        CartItem::new(id, format!("Item {id}"), Decimal::new(price, 0), quantity)
    }

    #[test]
    fn test_initialize_without_snapshot_is_empty() {
        let store = CartLoader::new(MemoryStorage::new()).initialize();
        assert!(store.is_empty());
        assert_eq!(store.total_item_count(), 0);
        assert_eq!(store.total_price(), Decimal::ZERO);
    }

    #[test]
    fn test_mutations_persist() {
        let mut storage = MemoryStorage::new();
        {
            let mut store = CartLoader::new(&mut storage).initialize();
            store.add_item(item("a", 10, 2));
        }
        let snapshot = storage.read(CART_SNAPSHOT_KEY).unwrap().unwrap();
        assert!(snapshot.contains("\"a\""));
    }

    #[test]
    fn test_reload_restores_items() {
        let mut storage = MemoryStorage::new();
        let original = {
            let mut store = CartLoader::new(&mut storage).initialize();
            store.add_item(item("a", 10, 2));
            store.add_item(item("b", 20, 1).with_promotional_price(Decimal::new(15, 0)));
            store.cart().clone()
        };

        let reloaded = CartLoader::new(&mut storage).initialize();
        assert_eq!(reloaded.cart(), &original);
        assert_eq!(reloaded.total_price(), Decimal::new(35, 0));
        assert_eq!(reloaded.total_item_count(), 3);
    }

    #[test]
    fn test_corrupt_snapshot_starts_empty_and_is_discarded() {
        let mut storage = MemoryStorage::new().with_entry(CART_SNAPSHOT_KEY, "{not json");
        let store = CartLoader::new(&mut storage).initialize();
        assert!(store.is_empty());
        drop(store);
        assert!(!storage.contains_key(CART_SNAPSHOT_KEY));
    }

    #[test]
    fn test_repairable_snapshot_is_rewritten() {
        let snapshot = r#"[
            {"id":"a","title":"A","unitPrice":1,"quantity":1},
            {"id":"a","title":"A again","unitPrice":5,"quantity":2},
            {"id":"b","title":"B","unitPrice":1,"quantity":0}
        ]"#;
        let mut storage = MemoryStorage::new().with_entry(CART_SNAPSHOT_KEY, snapshot);
        let store = CartLoader::new(&mut storage).initialize();
        assert_eq!(store.items().len(), 1);
        assert_eq!(store.total_item_count(), 3);
        drop(store);

        let rewritten = storage.read(CART_SNAPSHOT_KEY).unwrap().unwrap();
        assert!(!rewritten.contains("A again"));
    }

    #[test]
    fn test_reload_matches_what_was_accepted() {
        let mut storage = MemoryStorage::new();
        let before = {
            let mut store = CartLoader::new(&mut storage).initialize();
            store.add_item(CartItem::new("blank", "  ", Decimal::ONE, 2));
            store.add_item(CartItem::new("neg", "Troco", Decimal::NEGATIVE_ONE, 1));
            store.add_item(
                CartItem::new("p1", "Vinho", "12.345678901234567891".parse().unwrap(), 2)
                    .with_promotional_price("9.999999999999999999".parse().unwrap()),
            );
            store.cart().clone()
        };
        assert_eq!(before.line_count(), 1);

        let written = storage.read(CART_SNAPSHOT_KEY).unwrap().unwrap();
        let store = CartLoader::new(&mut storage).initialize();
        assert_eq!(store.cart(), &before);
        drop(store);
        assert_eq!(storage.read(CART_SNAPSHOT_KEY).unwrap().unwrap(), written);
    }

    #[test]
    fn test_bad_quantity_line_does_not_discard_cart() {
        let snapshot = r#"[
            {"id":"a","title":"A","unitPrice":"1.50","quantity":-1},
            {"id":"b","title":"B","unitPrice":"2.25","quantity":2}
        ]"#;
        let mut storage = MemoryStorage::new().with_entry(CART_SNAPSHOT_KEY, snapshot);
        let store = CartLoader::new(&mut storage).initialize();
        assert_eq!(store.items().len(), 1);
        assert_eq!(store.total_price(), Decimal::new(450, 2));
    }

    #[test]
    fn test_update_and_remove() {
        let mut store = CartLoader::new(MemoryStorage::new()).initialize();
        store.add_item(item("a", 10, 2));
        store.add_item(item("b", 5, 1));

        store.update_quantity(&ProductId::new("a"), 4);
        assert_eq!(store.get(&ProductId::new("a")).unwrap().quantity, 4);

        store.update_quantity(&ProductId::new("a"), 0);
        assert!(store.get(&ProductId::new("a")).is_none());

        store.remove_item(&ProductId::new("missing"));
        assert_eq!(store.total_item_count(), 1);

        store.remove_item(&ProductId::new("b"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_clear_removes_snapshot() {
        let mut storage = MemoryStorage::new();
        {
            let mut store = CartLoader::new(&mut storage).initialize();
            store.add_item(item("a", 10, 2));
            store.clear_cart();
            assert_eq!(store.total_item_count(), 0);
            assert_eq!(store.total_price(), Decimal::ZERO);
        }
        assert!(!storage.contains_key(CART_SNAPSHOT_KEY));
        assert!(CartLoader::new(&mut storage).initialize().is_empty());
    }

    #[test]
    fn test_custom_key() {
        let mut storage = MemoryStorage::new();
        {
            let mut store = CartLoader::with_key(&mut storage, "table-7").initialize();
            store.add_item(item("a", 1, 1));
        }
        assert!(storage.contains_key("table-7"));
        assert!(!storage.contains_key(CART_SNAPSHOT_KEY));
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = CartLoader::new(FileStorage::new(dir.path())).initialize();
            store.add_item(
                CartItem::new("p1", "Pretzel", Decimal::new(290, 1), 1).with_notes("sem sal"),
            );
            store.add_item(CartItem::new("p1", "ignored", Decimal::new(99, 0), 2));
        }

        let store = CartLoader::new(FileStorage::new(dir.path())).initialize();
        let line = store.get(&ProductId::new("p1")).unwrap();
        assert_eq!(line.title, "Pretzel");
        assert_eq!(line.quantity, 3);
        assert_eq!(line.notes.as_deref(), Some("sem sal"));
        assert_eq!(store.total_price(), Decimal::new(87, 0));
    }
}
