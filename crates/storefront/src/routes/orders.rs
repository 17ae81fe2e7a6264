//! Order tracking route handler.

use axum::{
    Json,
    extract::{Path, State},
};
use bistro_core::OrderId;
use tracing::instrument;

use crate::client::OrderSummary;
use crate::error::Result;
use crate::state::AppState;

/// Show the current state of an order.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OrderSummary>> {
    let order = state.orders().get_order(&OrderId::new(id)).await?;
    Ok(Json(order))
}
