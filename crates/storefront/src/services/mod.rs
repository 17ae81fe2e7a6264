//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `cart` - Cart store mirrored to a durable snapshot
//! - `checkout` - Cart validation and order submission

pub mod cart;
pub mod checkout;
