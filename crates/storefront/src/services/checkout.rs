//! Checkout: turn the current cart into an order.
//!
//! Validation happens before anything is sent. The cart is cleared only after
//! the Order Service has accepted the order; any failure leaves it untouched.

use bistro_core::{AddressError, Cart, DeliveryAddress, DeliveryMethod, OrderId, PaymentMethod};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::client::{ApiError, OrderClient, OrderLine, OrderRequest};
use crate::services::cart::CartStore;
use crate::storage::SnapshotStorage;

/// Customer choices collected at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckoutDetails {
    pub delivery_method: DeliveryMethod,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub address: Option<String>,
    /// Cash amount the customer will hand over.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub change_for: Option<Decimal>,
}

/// Errors that stop a checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("delivery requires an address")]
    MissingAddress,

    #[error("invalid address: {0}")]
    InvalidAddress(#[from] AddressError),

    #[error("change is only given for cash payments, not {0}")]
    ChangeNotAccepted(PaymentMethod),

    #[error("change for {change_for} does not cover the total of {total}")]
    InsufficientChange { change_for: Decimal, total: Decimal },

    #[error("order submission failed: {0}")]
    Submit(#[from] ApiError),
}

impl CheckoutError {
    /// Whether the customer can fix this by changing their input.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::Submit(_))
    }
}

/// Validate `details` against `cart` and build the order payload.
///
/// A pickup order never carries an address, even if one was given.
///
/// # Errors
///
/// Returns a [`CheckoutError`] describing the first rule the input breaks.
pub fn build_order_request(
    cart: &Cart,
    details: &CheckoutDetails,
) -> Result<OrderRequest, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let address = if details.delivery_method.requires_address() {
        let raw = details
            .address
            .as_deref()
            .filter(|a| !a.trim().is_empty())
            .ok_or(CheckoutError::MissingAddress)?;
        Some(DeliveryAddress::parse(raw)?)
    } else {
        None
    };

    if let Some(change_for) = details.change_for {
        if !details.payment_method.accepts_change() {
            return Err(CheckoutError::ChangeNotAccepted(details.payment_method));
        }
        let total = cart.total_price();
        if change_for < total {
            return Err(CheckoutError::InsufficientChange { change_for, total });
        }
    }

    Ok(OrderRequest {
        lines: cart.items().iter().map(OrderLine::from).collect(),
        delivery_method: details.delivery_method,
        payment_method: details.payment_method,
        address,
        change_for: details.change_for,
    })
}

/// Submit the cart as an order and clear it on success.
///
/// # Errors
///
/// Returns a [`CheckoutError`] if validation fails or the Order Service
/// rejects the order. The cart is unchanged in both cases.
#[instrument(skip_all, fields(
    delivery = %details.delivery_method,
    payment = %details.payment_method,
    lines = store.items().len(),
))]
pub async fn checkout<S: SnapshotStorage>(
    store: &mut CartStore<S>,
    orders: &OrderClient,
    details: &CheckoutDetails,
) -> Result<OrderId, CheckoutError> {
    let request = build_order_request(store.cart(), details)?;

    let order_id = match orders.submit_order(&request).await {
        Ok(id) => id,
        Err(e) => {
            warn!(error = %e, "Order submission failed, keeping cart");
            return Err(e.into());
        }
    };

    store.clear_cart();
    info!(order_id = %order_id, "Checkout complete");
    Ok(order_id)
}
