use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use mart_core::{MartError, MartService, ServiceCapabilities, TenantContext};
use serde_json::Value;

use crate::services::StoreParams;
use crate::store::{DocumentStore, Query, SortDirection, PURCHASE_REQUESTS};

use super::purchase_requests_shared;

pub struct PurchaseRequestsService {
    store: Arc<dyn DocumentStore>,
}

impl PurchaseRequestsService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl MartService<Value, StoreParams> for PurchaseRequestsService {
    fn capabilities(&self) -> ServiceCapabilities {
        purchase_requests_shared::capabilities()
    }

    async fn find(&self, ctx: &TenantContext, params: StoreParams) -> Result<Vec<Value>> {
        let mut query = Query::new().order_by("createdAt", SortDirection::Desc);
        if let Some(product_id) = params.query_str("productId") {
            query = query.where_eq("productId", product_id);
        }
        self.store.query(ctx, PURCHASE_REQUESTS, &query).await
    }

    async fn get(&self, ctx: &TenantContext, id: &str, _params: StoreParams) -> Result<Value> {
        self.store
            .get(ctx, PURCHASE_REQUESTS, id)
            .await?
            .ok_or_else(|| MartError::not_found(format!("Purchase request not found: {id}")).into_anyhow())
    }

    async fn create(&self, ctx: &TenantContext, data: Value, _params: StoreParams) -> Result<Value> {
        let created = self.store.insert(ctx, PURCHASE_REQUESTS, data).await?;
        let id = created.get("id").and_then(Value::as_str).unwrap_or_default();
        let product = created.get("productId").and_then(Value::as_str).unwrap_or_default();
        tracing::info!(id, product, "purchase request received");
        Ok(created)
    }
}
