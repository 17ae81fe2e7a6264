//! Command implementations.

pub mod cart;
pub mod catalog;
pub mod orders;

use std::path::Path;

use bistro_storefront::client::{ApiClient, ApiError, SelectionError};
use bistro_storefront::config::{ApiConfig, ConfigError};
use bistro_storefront::services::cart::{CartLoader, CartStore};
use bistro_storefront::services::checkout::CheckoutError;
use bistro_storefront::storage::FileStorage;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Catalog or Order Service call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Checkout was rejected.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Accompaniment selection did not match the product.
    #[error("{0}")]
    Selection(#[from] SelectionError),
}

/// Open the local cart snapshot under `data_dir`.
pub fn open_cart(data_dir: &Path) -> CartStore<FileStorage> {
    CartLoader::new(FileStorage::new(data_dir)).initialize()
}

/// Build an API client from the environment.
pub fn api_client() -> Result<(ApiClient, ApiConfig), CommandError> {
    let config = ApiConfig::from_env()?;
    Ok((ApiClient::new(&config), config))
}
