//! Core types for Bistro.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod id;
pub mod price;
pub mod status;

pub use address::{AddressError, DeliveryAddress};
pub use id::*;
pub use price::{CurrencyCode, Price};
pub use status::*;
