//! Catalog Service client.
//!
//! Products and categories are cached with `moka` for the configured TTL.

use std::sync::Arc;
use std::time::Duration;

use bistro_core::{CategoryId, ProductId};
use moka::future::Cache;
use tracing::{debug, instrument};

use super::cache::{CacheKey, CacheValue};
use super::types::{Category, CategoryRecord, Product, ProductRecord};
use super::{ApiClient, ApiError};

/// Upper bound on cached catalog entries.
const CACHE_CAPACITY: u64 = 1000;

/// Client for product and category lookups.
#[derive(Clone)]
pub struct CatalogClient {
    api: ApiClient,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogClient {
    /// Create a catalog client over `api`, caching responses for `ttl`.
    #[must_use]
    pub fn new(api: ApiClient, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(ttl)
            .build();
        Self { api, cache }
    }

    /// List every product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or any product is invalid.
    pub async fn list_products(&self) -> Result<Arc<Vec<Product>>, ApiError> {
        self.products(None).await
    }

    /// List the products of one category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or any product is invalid.
    pub async fn list_products_by_category(
        &self,
        category: &CategoryId,
    ) -> Result<Arc<Vec<Product>>, ApiError> {
        self.products(Some(category.clone())).await
    }

    /// Fetch one product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown id, or another error if the
    /// request fails or the product is invalid.
    #[instrument(skip(self, id), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let key = CacheKey::Product(id.clone());
        if let Some(CacheValue::Product(product)) = self.cache.get(&key).await {
            debug!("Cache hit");
            return Ok(*product);
        }

        let url = self.api.resource_url("produtos", id.as_str())?;
        let record: ProductRecord = self.api.get_json(url).await?;
        let product = Product::try_from(record)?;

        self.cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// List every category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or any category is invalid.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Arc<Vec<Category>>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit");
            return Ok(categories);
        }

        let url = self.api.url("categorias")?;
        let records: Vec<CategoryRecord> = self.api.get_json(url).await?;
        let categories = Arc::new(
            records
                .into_iter()
                .map(Category::try_from)
                .collect::<Result<Vec<_>, _>>()?,
        );

        self.cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(Arc::clone(&categories)),
            )
            .await;
        Ok(categories)
    }

    #[instrument(skip(self))]
    async fn products(&self, category: Option<CategoryId>) -> Result<Arc<Vec<Product>>, ApiError> {
        let key = CacheKey::Products {
            category: category.clone(),
        };
        if let Some(CacheValue::Products(products)) = self.cache.get(&key).await {
            debug!("Cache hit");
            return Ok(products);
        }

        let mut url = self.api.url("produtos")?;
        if let Some(category) = &category {
            url.query_pairs_mut()
                .append_pair("categoria_id", category.as_str());
        }

        let records: Vec<ProductRecord> = self.api.get_json(url).await?;
        let products = Arc::new(
            records
                .into_iter()
                .map(Product::try_from)
                .collect::<Result<Vec<_>, _>>()?,
        );
        debug!(count = products.len(), "Fetched products");

        self.cache
            .insert(key, CacheValue::Products(Arc::clone(&products)))
            .await;
        Ok(products)
    }
}
