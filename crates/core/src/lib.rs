//! Bistro Core - Shared types library.
//!
//! This crate provides common types used across all Bistro components:
//! - `storefront` - Ordering front end (cart, catalog, checkout, tracking)
//! - `cli` - Command-line tools for driving a local cart
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no storage,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, addresses, statuses
//! - [`cart`] - Cart line items and the cart aggregate

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{Cart, CartItem, CartItemError, Normalization};
pub use types::*;
