//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::client::{ApiClient, CatalogClient, OrderClient};
use crate::config::StorefrontConfig;
use crate::storage::{FileStorage, validate_key};

/// How long an idle cart lock is kept around.
const CART_LOCK_IDLE: Duration = Duration::from_secs(60 * 60);

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the API clients and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: CatalogClient,
    orders: OrderClient,
    cart_locks: Cache<String, Arc<Mutex<()>>>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let api = ApiClient::new(&config.api);
        let catalog = CatalogClient::new(api.clone(), config.api.catalog_cache_ttl);
        let orders = OrderClient::new(api);
        let cart_locks = Cache::builder().time_to_idle(CART_LOCK_IDLE).build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                orders,
                cart_locks,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the Catalog Service client.
    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    /// Get a reference to the Order Service client.
    #[must_use]
    pub fn orders(&self) -> &OrderClient {
        &self.inner.orders
    }

    /// Snapshot storage for one cart, rooted at `<data_dir>/<cart_key>`.
    ///
    /// Returns `None` if `cart_key` is not a safe path segment.
    #[must_use]
    pub fn cart_storage(&self, cart_key: &str) -> Option<FileStorage> {
        validate_key(cart_key).ok()?;
        Some(FileStorage::new(self.inner.config.data_dir.join(cart_key)))
    }

    /// Acquire the lock serializing requests on one cart.
    pub async fn lock_cart(&self, cart_key: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .inner
            .cart_locks
            .get_with(cart_key.to_string(), async { Arc::new(Mutex::new(())) })
            .await;
        lock.lock_owned().await
    }
}
