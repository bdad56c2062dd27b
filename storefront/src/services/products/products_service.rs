use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use mart_core::{MartError, MartService, ServiceCapabilities, TenantContext};
use mart_gallery::{BlobClient, GalleryImage};
use mart_blob::DeleteOutcome;
use serde_json::Value;

use crate::catalog::browse::value_matches_search;
use crate::models::normalize_gallery;
use crate::services::StoreParams;
use crate::store::{field, DocumentStore, Query, SortDirection, PRODUCTS};

use super::{products_shared, ProductParams};

pub struct ProductsService {
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobClient>,
}

impl ProductsService {
    pub fn new(store: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobClient>) -> Self {
        Self { store, blobs }
    }

    fn not_found(id: &str) -> anyhow::Error {
        MartError::not_found(format!("Product not found: {id}")).into_anyhow()
    }

    /// Blob cleanup after a delete. Failures only log.
    async fn delete_gallery_blobs(&self, product: &Value) {
        let gallery: Vec<GalleryImage> = product
            .get("gallery")
            .cloned()
            .and_then(|g| serde_json::from_value(g).ok())
            .unwrap_or_default();

        for image in gallery.iter().filter(|g| !g.path.is_empty()) {
            match self.blobs.delete(&image.path).await {
                Ok(DeleteOutcome::Deleted) => tracing::debug!(path = %image.path, "gallery blob deleted"),
                Ok(DeleteOutcome::NotFound) => tracing::debug!(path = %image.path, "gallery blob already gone"),
                Err(err) => tracing::warn!(path = %image.path, error = %err, "could not delete gallery blob"),
            }
        }
    }
}

#[async_trait]
impl MartService<Value, StoreParams> for ProductsService {
    fn capabilities(&self) -> ServiceCapabilities {
        products_shared::crud_capabilities()
    }

    async fn find(&self, ctx: &TenantContext, params: StoreParams) -> Result<Vec<Value>> {
        let p = ProductParams::from(&params);

        let mut query = Query::new().order_by("createdAt", SortDirection::Desc);
        if let Some(main) = &p.category {
            query = query.where_eq("category.main", main.as_str());
        }
        if let Some(slug) = &p.slug {
            query = query.where_eq("slug", slug.as_str());
        }

        let mut products = self.store.query(ctx, PRODUCTS, &query).await?;

        if let Some(sub) = &p.sub {
            products.retain(|doc| field(doc, "category.sub").and_then(Value::as_str) == Some(sub.as_str()));
        }
        if let Some(q) = &p.q {
            products.retain(|doc| value_matches_search(doc, q));
        }
        if let Some(limit) = p.limit {
            products.truncate(limit);
        }

        Ok(products)
    }

    async fn get(&self, ctx: &TenantContext, id: &str, _params: StoreParams) -> Result<Value> {
        self.store
            .get(ctx, PRODUCTS, id)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    async fn create(&self, ctx: &TenantContext, data: Value, _params: StoreParams) -> Result<Value> {
        let created = self.store.insert(ctx, PRODUCTS, data).await?;
        let id = created.get("id").and_then(Value::as_str).unwrap_or_default();
        let slug = created.get("slug").and_then(Value::as_str).unwrap_or_default();
        tracing::info!(id, slug, "product created");
        Ok(created)
    }

    async fn patch(&self, ctx: &TenantContext, id: &str, data: Value, _params: StoreParams) -> Result<Value> {
        let existing = self
            .store
            .get(ctx, PRODUCTS, id)
            .await?
            .ok_or_else(|| Self::not_found(id))?;

        let mut record = existing.as_object().cloned().unwrap_or_default();
        if let Some(patch) = data.as_object() {
            for (k, v) in patch {
                if matches!(k.as_str(), "id" | "slug" | "createdAt") {
                    continue;
                }
                record.insert(k.clone(), v.clone());
            }
        }

        let mut record = Value::Object(record);
        normalize_gallery(&mut record);

        self.store
            .replace(ctx, PRODUCTS, id, record)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    async fn remove(&self, ctx: &TenantContext, id: &str, _params: StoreParams) -> Result<Value> {
        let removed = self
            .store
            .delete(ctx, PRODUCTS, id)
            .await?
            .ok_or_else(|| Self::not_found(id))?;

        self.delete_gallery_blobs(&removed).await;
        tracing::info!(id, "product deleted");
        Ok(removed)
    }
}
