//! Cart line items and the cart aggregate.
//!
//! [`Cart`] is the pure, in-memory half of the cart: it owns the ordered list
//! of [`CartItem`]s and enforces the cart invariants. Persistence lives in the
//! storefront crate, which wraps a `Cart` and writes a snapshot after every
//! mutation.
//!
//! # Invariants
//!
//! - Item ids are unique; adding an id that is already present merges the
//!   quantities and keeps the metadata captured the first time.
//! - Every item present has `quantity >= 1`.
//! - The effective unit price is the promotional price when set, else the
//!   regular unit price.
//!
//! # Snapshot format
//!
//! A snapshot is a JSON array of items with camelCase keys. Prices are written
//! as decimal strings so they survive a reload exactly; plain JSON numbers are
//! accepted when reading. Optional fields may be omitted:
//!
//! ```json
//! [{"id":"p1","title":"Pretzel","unitPrice":"29.0","quantity":3}]
//! ```
//!
//! A line whose quantity is not a positive integer is dropped on load rather
//! than failing the whole snapshot.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::ProductId;

/// Errors that can occur when validating a [`CartItem`] before insertion.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartItemError {
    /// The product id is empty.
    #[error("item id cannot be empty")]
    EmptyId,
    /// The title is empty or whitespace.
    #[error("item title cannot be empty")]
    EmptyTitle,
    /// The regular unit price is negative.
    #[error("unit price cannot be negative (got {0})")]
    NegativePrice(Decimal),
    /// The promotional price is negative.
    #[error("promotional price cannot be negative (got {0})")]
    NegativePromotionalPrice(Decimal),
    /// The quantity is zero.
    #[error("quantity must be at least 1")]
    ZeroQuantity,
}

/// One line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product identifier, unique within the cart.
    pub id: ProductId,
    /// Display name captured when the item was added.
    pub title: String,
    /// Regular unit price captured when the item was added.
    #[serde(
        serialize_with = "rust_decimal::serde::str::serialize",
        deserialize_with = "rust_decimal::serde::float::deserialize"
    )]
    pub unit_price: Decimal,
    /// Promotional unit price; overrides `unit_price` when present.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "rust_decimal::serde::str_option::serialize",
        deserialize_with = "rust_decimal::serde::float_option::deserialize"
    )]
    pub promotional_price: Option<Decimal>,
    /// Number of units, always at least 1 while the item is in a cart.
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Per-line customization notes ("no onions").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Selected accompaniments by name, with their quantities.
    ///
    /// Accompaniment prices are already folded into the unit price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accompaniments: Option<BTreeMap<String, u32>>,
}

/// Read a quantity, mapping anything that is not a `u32` to zero.
///
/// Zero-quantity lines are dropped by [`Cart::from_items`], so a negative or
/// fractional quantity costs only its own line.
fn lenient_quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0))
}

impl CartItem {
    /// Create an item with only the required fields.
    #[must_use]
    pub fn new(
        id: impl Into<ProductId>,
        title: impl Into<String>,
        unit_price: Decimal,
        quantity: u32,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            unit_price,
            promotional_price: None,
            quantity,
            image_url: None,
            notes: None,
            accompaniments: None,
        }
    }

    #[must_use]
    pub const fn with_promotional_price(mut self, price: Decimal) -> Self {
        self.promotional_price = Some(price);
        self
    }

    #[must_use]
    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    #[must_use]
    pub fn with_accompaniments(mut self, accompaniments: BTreeMap<String, u32>) -> Self {
        self.accompaniments = Some(accompaniments);
        self
    }

    /// The price charged per unit: promotional price if set, else unit price.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        self.promotional_price.unwrap_or(self.unit_price)
    }

    /// Effective price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.effective_price() * Decimal::from(self.quantity)
    }

    /// Check the item is fit to enter a cart.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), CartItemError> {
        if self.id.as_str().is_empty() {
            return Err(CartItemError::EmptyId);
        }
        if self.title.trim().is_empty() {
            return Err(CartItemError::EmptyTitle);
        }
        if self.unit_price.is_sign_negative() && !self.unit_price.is_zero() {
            return Err(CartItemError::NegativePrice(self.unit_price));
        }
        if let Some(promo) = self
            .promotional_price
            .filter(|promo| promo.is_sign_negative() && !promo.is_zero())
        {
            return Err(CartItemError::NegativePromotionalPrice(promo));
        }
        if self.quantity == 0 {
            return Err(CartItemError::ZeroQuantity);
        }
        Ok(())
    }
}

/// What had to be repaired when building a cart from untrusted items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Normalization {
    /// Lines whose id was already present and were merged into it.
    pub merged_duplicates: usize,
    /// Lines dropped because their quantity was zero or not a whole number.
    pub dropped_empty: usize,
    /// Lines dropped because they failed [`CartItem::validate`] otherwise.
    pub dropped_invalid: usize,
}

impl Normalization {
    /// True when the input already satisfied every invariant.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.merged_duplicates == 0 && self.dropped_empty == 0 && self.dropped_invalid == 0
    }
}

/// The cart aggregate: an ordered list of line items keyed by product id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from items that may violate the invariants.
    ///
    /// Items are added in order with the same merge rule as [`Cart::add_item`];
    /// zero-quantity items and items that fail validation are dropped.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = CartItem>) -> (Self, Normalization) {
        let mut cart = Self::new();
        let mut report = Normalization::default();
        for item in items {
            match item.validate() {
                Ok(()) => {}
                Err(CartItemError::ZeroQuantity) => {
                    report.dropped_empty += 1;
                    continue;
                }
                Err(_) => {
                    report.dropped_invalid += 1;
                    continue;
                }
            }
            if cart.contains(&item.id) {
                report.merged_duplicates += 1;
            }
            cart.add_item(item);
        }
        (cart, report)
    }

    /// Parse a durable snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot is not a JSON array of items.
    pub fn from_snapshot(snapshot: &str) -> Result<(Self, Normalization), serde_json::Error> {
        let items: Vec<CartItem> = serde_json::from_str(snapshot)?;
        Ok(Self::from_items(items))
    }

    /// Serialize the item list to the snapshot format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_snapshot(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.items)
    }

    /// Items in insertion (display) order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Look up a line by product id.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.get(id).is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines (not units).
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Add an item, merging into an existing line with the same id.
    ///
    /// When the id is present only the quantity changes; the incoming title,
    /// prices and other fields are discarded. An item that fails
    /// [`CartItem::validate`] (including a zero quantity) is ignored, so the
    /// cart never holds a line a reload would drop.
    /// Returns `true` if the cart changed.
    pub fn add_item(&mut self, item: CartItem) -> bool {
        if item.validate().is_err() {
            return false;
        }
        match self.items.iter_mut().find(|line| line.id == item.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(item.quantity),
            None => self.items.push(item),
        }
        true
    }

    /// Remove the line with `id`, returning it if it was present.
    pub fn remove_item(&mut self, id: &ProductId) -> Option<CartItem> {
        let index = self.items.iter().position(|item| &item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Set the quantity of a line; zero or negative removes it.
    ///
    /// Returns `true` if a line with `id` existed.
    pub fn update_quantity(&mut self, id: &ProductId, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove_item(id).is_some();
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        match self.items.iter_mut().find(|item| &item.id == id) {
            Some(item) => {
                item.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of effective price times quantity across all lines, unrounded.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pretzel(quantity: u32) -> CartItem {
        CartItem::new("p1", "Pretzel", Decimal::new(290, 1), quantity)
    }

    fn sample_cart() -> Cart {
        let mut cart = Cart::new();
        cart.add_item(CartItem::new("a", "Coxinha", Decimal::new(10, 0), 2));
        cart.add_item(
            CartItem::new("b", "Pastel", Decimal::new(20, 0), 1)
                .with_promotional_price(Decimal::new(15, 0)),
        );
        cart
    }

    #[test]
    fn test_distinct_adds_create_one_line_each() {
        let mut cart = Cart::new();
        for (id, qty) in [("a", 1), ("b", 4), ("c", 2)] {
            cart.add_item(CartItem::new(id, "item", Decimal::ONE, qty));
        }
        assert_eq!(cart.line_count(), 3);
        assert_eq!(cart.get(&ProductId::new("b")).unwrap().quantity, 4);
    }

    #[test]
    fn test_duplicate_add_merges_and_keeps_first_metadata() {
        let mut cart = Cart::new();
        cart.add_item(pretzel(1).with_notes("extra salt"));
        cart.add_item(
            CartItem::new("p1", "ignored", Decimal::new(99, 0), 2).with_image_url("x.png"),
        );

        assert_eq!(cart.line_count(), 1);
        let line = cart.get(&ProductId::new("p1")).unwrap();
        assert_eq!(line.title, "Pretzel");
        assert_eq!(line.unit_price, Decimal::new(29, 0));
        assert_eq!(line.quantity, 3);
        assert_eq!(line.notes.as_deref(), Some("extra salt"));
        assert!(line.image_url.is_none());
        assert_eq!(cart.total_price(), Decimal::new(87, 0));
    }

    #[test]
    fn test_insertion_order_is_display_order() {
        let mut cart = sample_cart();
        cart.add_item(CartItem::new("c", "Suco", Decimal::new(8, 0), 1));
        cart.add_item(CartItem::new("a", "Coxinha", Decimal::new(10, 0), 1));
        let ids: Vec<_> = cart.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn test_zero_quantity_add_is_ignored() {
        let mut cart = Cart::new();
        assert!(!cart.add_item(pretzel(0)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_invalid_add_is_ignored() {
        let mut cart = Cart::new();
        assert!(!cart.add_item(CartItem::new("p1", "", Decimal::ONE, 2)));
        assert!(!cart.add_item(CartItem::new("p2", "Suco", Decimal::NEGATIVE_ONE, 1)));
        assert!(!cart.add_item(
            pretzel(1).with_promotional_price(Decimal::new(-5, 1))
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_accepted_items_survive_reload() {
        let mut cart = Cart::new();
        cart.add_item(CartItem::new("p1", "", Decimal::ONE, 2));
        cart.add_item(pretzel(2));
        cart.add_item(CartItem::new("p3", "Bala", Decimal::ZERO, 1));

        let (restored, report) = Cart::from_snapshot(&cart.to_snapshot().unwrap()).unwrap();
        assert!(report.is_clean());
        assert_eq!(restored, cart);
    }

    #[test]
    fn test_update_quantity_zero_removes() {
        let mut cart = sample_cart();
        assert!(cart.update_quantity(&ProductId::new("a"), 0));
        assert!(!cart.contains(&ProductId::new("a")));
        assert_eq!(cart.line_count(), 1);
    }

    #[test]
    fn test_update_quantity_negative_removes() {
        let mut cart = sample_cart();
        cart.update_quantity(&ProductId::new("b"), -3);
        assert!(!cart.contains(&ProductId::new("b")));
    }

    #[test]
    fn test_update_quantity_sets_value() {
        let mut cart = sample_cart();
        cart.update_quantity(&ProductId::new("a"), 5);
        assert_eq!(cart.get(&ProductId::new("a")).unwrap().quantity, 5);
        assert_eq!(cart.total_item_count(), 6);
    }

    #[test]
    fn test_update_missing_is_noop() {
        let mut cart = sample_cart();
        let before = cart.clone();
        assert!(!cart.update_quantity(&ProductId::new("zzz"), 3));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut cart = sample_cart();
        let before = cart.clone();
        assert!(cart.remove_item(&ProductId::new("zzz")).is_none());
        assert_eq!(cart, before);
    }

    #[test]
    fn test_totals_use_promotional_price() {
        let cart = sample_cart();
        assert_eq!(cart.total_price(), Decimal::new(35, 0));
        assert_eq!(cart.total_item_count(), 3);
    }

    #[test]
    fn test_empty_totals() {
        let cart = Cart::new();
        assert_eq!(cart.total_price(), Decimal::ZERO);
        assert_eq!(cart.total_item_count(), 0);
    }

    #[test]
    fn test_totals_are_not_rounded() {
        let mut cart = Cart::new();
        cart.add_item(CartItem::new("x", "Bala", Decimal::new(3333, 3), 3));
        assert_eq!(cart.total_price(), Decimal::new(9999, 3));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut cart = sample_cart();
        let mut extras = BTreeMap::new();
        extras.insert("Vinagrete".to_string(), 2);
        cart.add_item(
            CartItem::new("c", "Espetinho", Decimal::new(125, 1), 2)
                .with_image_url("https://cdn.example.com/c.jpg")
                .with_notes("bem passado")
                .with_accompaniments(extras),
        );

        let snapshot = cart.to_snapshot().unwrap();
        let (restored, report) = Cart::from_snapshot(&snapshot).unwrap();

        assert!(report.is_clean());
        assert_eq!(restored, cart);
    }

    #[test]
    fn test_snapshot_keeps_full_price_precision() {
        let price: Decimal = "12.345678901234567891".parse().unwrap();
        let promo: Decimal = "9.999999999999999999".parse().unwrap();
        let mut cart = Cart::new();
        cart.add_item(CartItem::new("p1", "Vinho", price, 3).with_promotional_price(promo));

        let (restored, _) = Cart::from_snapshot(&cart.to_snapshot().unwrap()).unwrap();
        let line = restored.get(&ProductId::new("p1")).unwrap();
        assert_eq!(line.unit_price, price);
        assert_eq!(line.promotional_price, Some(promo));
        assert_eq!(restored.total_price(), cart.total_price());
    }

    #[test]
    fn test_snapshot_writes_prices_as_strings() {
        let snapshot = sample_cart().to_snapshot().unwrap();
        let lines: serde_json::Value = serde_json::from_str(&snapshot).unwrap();
        assert_eq!(lines[0]["unitPrice"], "10");
        assert_eq!(lines[1]["promotionalPrice"], "15");
    }

    #[test]
    fn test_snapshot_drops_lines_with_bad_quantity() {
        let json = r#"[
            {"id":"a","title":"Coxinha","unitPrice":5,"quantity":-2},
            {"id":"b","title":"Pastel","unitPrice":5,"quantity":1.5},
            {"id":"c","title":"Suco","unitPrice":"8.5","quantity":2},
            {"id":"d","title":"Bala","unitPrice":1}
        ]"#;
        let (cart, report) = Cart::from_snapshot(json).unwrap();
        assert_eq!(cart.line_count(), 1);
        assert_eq!(report.dropped_empty, 3);
        assert_eq!(cart.total_price(), Decimal::new(17, 0));
    }

    #[test]
    fn test_snapshot_tolerates_missing_optional_fields() {
        let json = r#"[{"id":"p1","title":"Pretzel","unitPrice":29,"quantity":1}]"#;
        let (cart, _) = Cart::from_snapshot(json).unwrap();
        let line = cart.get(&ProductId::new("p1")).unwrap();
        assert!(line.promotional_price.is_none());
        assert!(line.accompaniments.is_none());
        assert_eq!(line.unit_price, Decimal::new(29, 0));
    }

    #[test]
    fn test_snapshot_accepts_numeric_ids() {
        let json = r#"[{"id":7,"title":"Suco","unitPrice":8.5,"quantity":2}]"#;
        let (cart, _) = Cart::from_snapshot(json).unwrap();
        assert_eq!(cart.total_price(), Decimal::new(17, 0));
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let cart = sample_cart();
        let snapshot = cart.to_snapshot().unwrap();
        assert!(snapshot.contains("\"unitPrice\""));
        assert!(snapshot.contains("\"promotionalPrice\""));
        assert!(!snapshot.contains("imageUrl"));
    }

    #[test]
    fn test_snapshot_drops_invalid_lines() {
        let json = r#"[
            {"id":"a","title":"Coxinha","unitPrice":-3,"quantity":1},
            {"id":"b","title":"   ","unitPrice":5,"quantity":1},
            {"id":"c","title":"Pastel","unitPrice":5,"quantity":2}
        ]"#;
        let (cart, report) = Cart::from_snapshot(json).unwrap();
        assert_eq!(cart.line_count(), 1);
        assert_eq!(report.dropped_invalid, 2);
        assert_eq!(cart.total_price(), Decimal::new(10, 0));
    }

    #[test]
    fn test_invalid_snapshot_is_error() {
        assert!(Cart::from_snapshot("{not json").is_err());
        assert!(Cart::from_snapshot(r#"{"id":"p1"}"#).is_err());
    }

    #[test]
    fn test_from_items_normalizes() {
        let (cart, report) = Cart::from_items([pretzel(1), pretzel(0), pretzel(2)]);
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_item_count(), 3);
        assert_eq!(report.merged_duplicates, 1);
        assert_eq!(report.dropped_empty, 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_validate() {
        assert!(pretzel(1).validate().is_ok());
        assert_eq!(pretzel(0).validate(), Err(CartItemError::ZeroQuantity));
        assert_eq!(
            CartItem::new("", "x", Decimal::ONE, 1).validate(),
            Err(CartItemError::EmptyId)
        );
        assert_eq!(
            CartItem::new("p", "  ", Decimal::ONE, 1).validate(),
            Err(CartItemError::EmptyTitle)
        );
        assert!(matches!(
            CartItem::new("p", "x", Decimal::NEGATIVE_ONE, 1).validate(),
            Err(CartItemError::NegativePrice(_))
        ));
        assert!(matches!(
            pretzel(1)
                .with_promotional_price(Decimal::NEGATIVE_ONE)
                .validate(),
            Err(CartItemError::NegativePromotionalPrice(_))
        ));
    }
}
