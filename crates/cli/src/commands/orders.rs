//! Checkout and order tracking commands.

use std::path::Path;

use bistro_core::{OrderId, Price};
use bistro_storefront::client::OrderClient;
use bistro_storefront::services::checkout::{CheckoutDetails, checkout as place_order};

use super::{CommandError, api_client, open_cart};

/// Submit the local cart as an order; the cart is cleared on success.
pub async fn checkout(data_dir: &Path, details: &CheckoutDetails) -> Result<(), CommandError> {
    let (api, _) = api_client()?;
    let orders = OrderClient::new(api);

    let mut cart = open_cart(data_dir);
    let total = cart.total_price();
    let order_id = place_order(&mut cart, &orders, details).await?;

    tracing::info!(
        "Order {} placed, total {}",
        order_id,
        Price::from_amount(total).display()
    );
    Ok(())
}

/// Show the current state of an order.
pub async fn track(id: &str) -> Result<(), CommandError> {
    let (api, _) = api_client()?;
    let order = OrderClient::new(api).get_order(&OrderId::new(id)).await?;

    tracing::info!(
        "Order {}: {} ({}), placed {}",
        order.id,
        order.status,
        Price::from_amount(order.total).display(),
        order.created_at.format("%Y-%m-%d %H:%M UTC")
    );
    if order.status.is_final() {
        tracing::info!("This order is closed");
    }
    Ok(())
}
