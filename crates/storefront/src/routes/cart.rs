//! Cart route handlers.
//!
//! Every handler opens the session's cart under its lock, applies one
//! operation through the cart store and answers with the resulting view.
//! Cart keys are stored in the session and name a snapshot directory.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, State},
};
use bistro_core::{CartItem, Price, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::OwnedMutexGuard;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::CartSession;
use crate::services::cart::{CartLoader, CartStore};
use crate::state::AppState;
use crate::storage::FileStorage;

/// One cart line as the API returns it.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    pub id: ProductId,
    pub title: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub promotional_price: Option<Decimal>,
    pub effective_price: Decimal,
    pub line_total: Decimal,
    pub line_total_display: String,
    pub image_url: Option<String>,
    pub notes: Option<String>,
    pub accompaniments: Option<BTreeMap<String, u32>>,
}

/// The whole cart as the API returns it.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub item_count: u64,
    pub subtotal: Decimal,
    pub subtotal_display: String,
}

impl From<&CartItem> for CartLineView {
    fn from(item: &CartItem) -> Self {
        let line_total = item.line_total();
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            promotional_price: item.promotional_price,
            effective_price: item.effective_price(),
            line_total,
            line_total_display: Price::from_amount(line_total).display(),
            image_url: item.image_url.clone(),
            notes: item.notes.clone(),
            accompaniments: item.accompaniments.clone(),
        }
    }
}

impl<S: crate::storage::SnapshotStorage> From<&CartStore<S>> for CartView {
    fn from(store: &CartStore<S>) -> Self {
        let subtotal = store.total_price();
        Self {
            items: store.items().iter().map(CartLineView::from).collect(),
            item_count: store.total_item_count(),
            subtotal,
            subtotal_display: Price::from_amount(subtotal).display(),
        }
    }
}

/// Cart count badge data.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u64,
}

/// Add to cart request body.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
    pub notes: Option<String>,
    #[serde(default)]
    pub accompaniments: BTreeMap<String, u32>,
}

/// Update quantity request body.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

// =============================================================================
// Cart Access
// =============================================================================

/// A loaded cart plus the lock that keeps other requests off it.
pub(crate) struct OpenCart {
    pub store: CartStore<FileStorage>,
    _guard: OwnedMutexGuard<()>,
}

/// Lock and load the cart behind `session`.
pub(crate) async fn open_cart(state: &AppState, session: &CartSession) -> Result<OpenCart> {
    let guard = state.lock_cart(session.key()).await;
    let storage = state
        .cart_storage(session.key())
        .ok_or_else(|| AppError::Internal(format!("unusable cart key {:?}", session.key())))?;

    Ok(OpenCart {
        store: CartLoader::new(storage).initialize(),
        _guard: guard,
    })
}

// =============================================================================
// Handlers
// =============================================================================

/// Show the cart.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: CartSession) -> Result<Json<CartView>> {
    let cart = open_cart(&state, &session).await?;
    Ok(Json(CartView::from(&cart.store)))
}

/// Add a product to the cart, merging with an existing line.
///
/// Title and prices are taken from the catalog, never from the request.
#[instrument(skip(state, session, request), fields(product_id = %request.product_id))]
pub async fn add(
    State(state): State<AppState>,
    session: CartSession,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartView>> {
    let product = state.catalog().get_product(&request.product_id).await?;
    let item = product.to_cart_item(
        request.quantity.unwrap_or(1),
        request.notes,
        &request.accompaniments,
    )?;

    let mut cart = open_cart(&state, &session).await?;
    cart.store.add_item(item);
    add_breadcrumb(
        "cart",
        "Added item",
        Some(&[("product_id", request.product_id.as_str())]),
    );

    Ok(Json(CartView::from(&cart.store)))
}

/// Set a line's quantity; zero or less removes it.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: CartSession,
    Path(id): Path<String>,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartView>> {
    let mut cart = open_cart(&state, &session).await?;
    cart.store
        .update_quantity(&ProductId::new(id), request.quantity);
    Ok(Json(CartView::from(&cart.store)))
}

/// Remove a line.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: CartSession,
    Path(id): Path<String>,
) -> Result<Json<CartView>> {
    let mut cart = open_cart(&state, &session).await?;
    cart.store.remove_item(&ProductId::new(id));
    Ok(Json(CartView::from(&cart.store)))
}

/// Empty the cart.
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: CartSession) -> Result<Json<CartView>> {
    let mut cart = open_cart(&state, &session).await?;
    cart.store.clear_cart();
    Ok(Json(CartView::from(&cart.store)))
}

/// Total quantity across lines, for the cart badge.
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: CartSession) -> Result<Json<CartCount>> {
    let cart = open_cart(&state, &session).await?;
    Ok(Json(CartCount {
        count: cart.store.total_item_count(),
    }))
}
