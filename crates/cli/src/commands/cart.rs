//! Local cart commands.
//!
//! # Usage
//!
//! ```bash
//! bistro cart show
//! bistro cart add 12 --quantity 2 --with Coalhada=1 --notes "bem quente"
//! bistro cart update 12 3
//! bistro cart remove 12
//! bistro cart clear
//! ```
//!
//! Every command except `add` works offline; `add` looks the product up in
//! the catalog so the cart captures its current title and prices.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::Path;

use bistro_core::{Price, ProductId};
use bistro_storefront::client::{CatalogClient, SelectionError};
use bistro_storefront::services::cart::CartStore;
use bistro_storefront::storage::SnapshotStorage;

use super::{CommandError, api_client, open_cart};

/// Log the cart contents and totals.
pub fn show(data_dir: &Path) {
    log_cart(&open_cart(data_dir));
}

/// Add `quantity` of a catalog product to the cart.
pub async fn add(
    data_dir: &Path,
    product_id: &str,
    quantity: u32,
    notes: Option<String>,
    selection: &BTreeMap<String, u32>,
) -> Result<(), CommandError> {
    let (api, config) = api_client()?;
    let catalog = CatalogClient::new(api, config.catalog_cache_ttl);
    let product = catalog.get_product(&ProductId::new(product_id)).await?;
    let item = product.to_cart_item(quantity, notes, selection)?;

    let mut cart = open_cart(data_dir);
    cart.add_item(item);
    tracing::info!("Added {} x {}", quantity, product.title);
    log_cart(&cart);
    Ok(())
}

/// Set a line's quantity; zero or less removes it.
pub fn update(data_dir: &Path, product_id: &str, quantity: i64) {
    let mut cart = open_cart(data_dir);
    cart.update_quantity(&ProductId::new(product_id), quantity);
    log_cart(&cart);
}

/// Remove a line.
pub fn remove(data_dir: &Path, product_id: &str) {
    let mut cart = open_cart(data_dir);
    cart.remove_item(&ProductId::new(product_id));
    log_cart(&cart);
}

/// Empty the cart and delete its snapshot.
pub fn clear(data_dir: &Path) {
    open_cart(data_dir).clear_cart();
    tracing::info!("Cart cleared");
}

/// Parse a `NAME=QTY` accompaniment selection.
pub fn parse_selection(s: &str) -> Result<(String, u32), String> {
    let (name, quantity) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=QTY, got {s:?}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing accompaniment name in {s:?}"));
    }
    let quantity = quantity
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid quantity in {s:?}: {e}"))?;
    Ok((name.to_string(), quantity))
}

/// Gather parsed `--with` selections, rejecting a name given twice.
pub fn collect_selection(
    pairs: impl IntoIterator<Item = (String, u32)>,
) -> Result<BTreeMap<String, u32>, SelectionError> {
    let mut selection = BTreeMap::new();
    for (name, quantity) in pairs {
        match selection.entry(name) {
            Entry::Vacant(slot) => {
                slot.insert(quantity);
            }
            Entry::Occupied(slot) => {
                return Err(SelectionError::DuplicateAccompaniment(slot.key().clone()));
            }
        }
    }
    Ok(selection)
}

fn log_cart<S: SnapshotStorage>(cart: &CartStore<S>) {
    if cart.is_empty() {
        tracing::info!("Cart is empty");
        return;
    }

    for item in cart.items() {
        let mut line = format!(
            "{:>3} x {} [{}] {}",
            item.quantity,
            item.title,
            item.id,
            Price::from_amount(item.line_total()).display()
        );
        if let Some(accompaniments) = &item.accompaniments {
            let extras: Vec<String> = accompaniments
                .iter()
                .map(|(name, count)| format!("{count} {name}"))
                .collect();
            line.push_str(&format!(" + {}", extras.join(", ")));
        }
        if let Some(notes) = &item.notes {
            line.push_str(&format!(" ({notes})"));
        }
        tracing::info!("{line}");
    }
    tracing::info!(
        "{} items, total {}",
        cart.total_item_count(),
        Price::from_amount(cart.total_price()).display()
    );
}
