//! Clients for the remote Catalog and Order services.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP via `reqwest`; one shared [`ApiClient`] holds the
//!   connection pool, base URL and bearer token
//! - The remote API is the source of truth for products and orders; only the
//!   cart lives locally
//! - Every response is decoded into a wire record and validated into a domain
//!   type before anything else sees it
//! - Catalog responses are cached in memory via `moka`
//!
//! # Example
//!
//! ```rust,ignore
//! use bistro_storefront::client::{ApiClient, CatalogClient, OrderClient};
//!
//! let api = ApiClient::new(&config.api);
//! let catalog = CatalogClient::new(api.clone(), config.api.catalog_cache_ttl);
//! let orders = OrderClient::new(api);
//!
//! let product = catalog.get_product(&ProductId::new("42")).await?;
//! ```

mod cache;
mod catalog;
mod orders;
pub mod types;

pub use catalog::CatalogClient;
pub use orders::OrderClient;
pub use types::*;

use std::sync::Arc;

use reqwest::{RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::ApiConfig;

/// Longest response body kept in an error message.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Errors that can occur when talking to the remote API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The response parsed but broke the expected schema.
    #[error("Invalid response: {0}")]
    Invalid(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Shared HTTP helper for the remote API.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    token: Option<SecretString>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("token", &self.inner.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl ApiClient {
    /// Create a client for the API described by `config`.
    #[must_use]
    pub fn new(config: &ApiConfig) -> Self {
        // Url::join drops the last path segment unless the base ends in '/'
        let mut base_url = config.base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Self {
            inner: Arc::new(ApiClientInner {
                http: reqwest::Client::new(),
                base_url,
                token: config.token.clone(),
            }),
        }
    }

    /// The normalized base URL (always ends in `/`).
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Resolve an endpoint path against the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Resolve `<collection>/<id>`, percent-encoding the id as one segment.
    pub(crate) fn resource_url(&self, collection: &str, id: &str) -> Result<Url, ApiError> {
        let mut url = self.url(collection)?;
        url.path_segments_mut()
            .map_err(|()| ApiError::Invalid("base URL cannot hold a path".to_string()))?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    /// GET `url` and decode the JSON body.
    #[instrument(skip(self, url), fields(url = %url))]
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let request = self.inner.http.get(url.clone());
        let body = self.send(request, &url).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// POST a JSON body to `url` and decode the JSON response.
    #[instrument(skip(self, url, payload), fields(url = %url))]
    pub(crate) async fn post_json<B, T>(&self, url: Url, payload: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let request = self.inner.http.post(url.clone()).json(payload);
        let body = self.send(request, &url).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn send(&self, request: RequestBuilder, url: &Url) -> Result<String, ApiError> {
        let request = match &self.inner.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        };

        let response = request.header("Accept", "application/json").send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "API response");

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(url.path().to_string()));
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        Ok(body)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn config(base: &str) -> ApiConfig {
        ApiConfig {
            base_url: Url::parse(base).unwrap(),
            token: None,
            catalog_cache_ttl: Duration::from_secs(60),
        }
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = ApiClient::new(&config("http://api.local/v1"));
        assert_eq!(client.base_url().as_str(), "http://api.local/v1/");
    }

    #[test]
    fn test_url_joins_relative_paths() {
        let client = ApiClient::new(&config("http://api.local/v1/"));
        assert_eq!(
            client.url("produtos/7").unwrap().as_str(),
            "http://api.local/v1/produtos/7"
        );
        assert_eq!(
            client.url("/pedidos").unwrap().as_str(),
            "http://api.local/v1/pedidos"
        );
    }

    #[test]
    fn test_resource_url_encodes_id() {
        let client = ApiClient::new(&config("http://api.local/v1"));
        assert_eq!(
            client.resource_url("produtos", "42").unwrap().as_str(),
            "http://api.local/v1/produtos/42"
        );
        assert_eq!(
            client.resource_url("produtos", "../admin").unwrap().as_str(),
            "http://api.local/v1/produtos/..%2Fadmin"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let mut cfg = config("http://api.local/");
        cfg.token = Some(SecretString::from("tk_live_9f8e7d6c5b4a"));
        let client = ApiClient::new(&cfg);
        let debug = format!("{client:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("tk_live"));
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "API returned 502: bad gateway");
    }
}
