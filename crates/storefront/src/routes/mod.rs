//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health               - Health check
//!
//! # Catalog
//! GET    /products             - Product listing (?category=<id>)
//! GET    /products/{id}        - Product detail
//! GET    /categories           - Category listing
//!
//! # Cart (JSON)
//! GET    /cart                 - Cart view
//! DELETE /cart                 - Clear cart
//! POST   /cart/items           - Add item (merges with an existing line)
//! PATCH  /cart/items/{id}      - Update quantity (0 removes)
//! DELETE /cart/items/{id}      - Remove item
//! GET    /cart/count           - Total quantity
//!
//! # Checkout
//! POST   /checkout             - Place order, clear cart
//! GET    /orders/{id}          - Order tracking
//! ```

pub mod cart;
pub mod checkout;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add))
        .route("/items/{id}", patch(cart::update).delete(cart::remove))
        .route("/count", get(cart::count))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Catalog routes
        .nest("/products", product_routes())
        .route("/categories", get(products::categories))
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout and tracking
        .route("/checkout", post(checkout::submit))
        .route("/orders/{id}", get(orders::show))
}
