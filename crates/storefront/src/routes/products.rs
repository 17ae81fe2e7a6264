//! Catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use bistro_core::{CategoryId, ProductId};
use serde::Deserialize;
use tracing::instrument;

use crate::client::{Category, Product};
use crate::error::Result;
use crate::state::AppState;

/// Product listing filter.
#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
}

/// List products, optionally restricted to one category.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<Product>>> {
    let products = match query.category.filter(|c| !c.is_empty()) {
        Some(category) => {
            state
                .catalog()
                .list_products_by_category(&CategoryId::new(category))
                .await?
        }
        None => state.catalog().list_products().await?,
    };
    Ok(Json(products.to_vec()))
}

/// Show one product.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>> {
    let product = state.catalog().get_product(&ProductId::new(id)).await?;
    Ok(Json(product))
}

/// List categories.
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = state.catalog().list_categories().await?;
    Ok(Json(categories.to_vec()))
}
