//! Order Service client.

use bistro_core::OrderId;
use tracing::{info, instrument};

use super::types::{OrderCreatedRecord, OrderRecord, OrderRequest, OrderSummary};
use super::{ApiClient, ApiError};

/// Client for placing and tracking orders. Never cached.
#[derive(Debug, Clone)]
pub struct OrderClient {
    api: ApiClient,
}

impl OrderClient {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Submit an order and return the id the Order Service assigned.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response has no id.
    #[instrument(skip(self, request), fields(lines = request.lines.len()))]
    pub async fn submit_order(&self, request: &OrderRequest) -> Result<OrderId, ApiError> {
        let url = self.api.url("pedidos")?;
        let created: OrderCreatedRecord = self.api.post_json(url, request).await?;
        if created.id.as_str().is_empty() {
            return Err(ApiError::Invalid("order response has an empty id".to_string()));
        }
        info!(order_id = %created.id, "Order placed");
        Ok(created.id)
    }

    /// Fetch the current state of an order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown id, or another error if the
    /// request fails.
    #[instrument(skip(self, id), fields(order_id = %id))]
    pub async fn get_order(&self, id: &OrderId) -> Result<OrderSummary, ApiError> {
        let url = self.api.resource_url("pedidos", id.as_str())?;
        let record: OrderRecord = self.api.get_json(url).await?;
        Ok(OrderSummary::from(record))
    }
}
