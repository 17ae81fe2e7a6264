//! Checkout route handler.

use axum::{Json, extract::State, http::StatusCode};
use bistro_core::OrderId;
use serde::Serialize;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::CartSession;
use crate::routes::cart::open_cart;
use crate::services::checkout::{CheckoutDetails, checkout};
use crate::state::AppState;

/// Response to a successful checkout.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order_id: OrderId,
}

/// Place an order for the session's cart and clear it.
#[instrument(skip(state, session, details))]
pub async fn submit(
    State(state): State<AppState>,
    session: CartSession,
    Json(details): Json<CheckoutDetails>,
) -> Result<(StatusCode, Json<CheckoutResponse>)> {
    let mut cart = open_cart(&state, &session).await?;
    let order_id = checkout(&mut cart.store, state.orders(), &details).await?;
    Ok((StatusCode::CREATED, Json(CheckoutResponse { order_id })))
}
