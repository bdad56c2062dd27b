//! Back-office endpoints: listing stats, sample data, bulk delete.

use std::collections::HashSet;

use axum::{
    extract::State,
    http::HeaderMap,
    routing::{delete, get, post},
    Json, Router,
};
use mart_axum::{tenant_from_headers, MartAxumError};
use serde::Serialize;
use serde_json::{json, Value};

use crate::models::Product;
use crate::seed::{seed_catalog, SeedSummary};
use crate::services::StoreParams;
use crate::state::StorefrontState;

type ApiResult<T> = Result<Json<T>, MartAxumError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total_products: usize,
    pub categories: usize,
    pub verified_sellers: usize,
}

impl CatalogStats {
    pub fn from_products(products: &[Product]) -> Self {
        let categories: HashSet<&str> = products.iter().map(|p| p.category.main.as_str()).collect();
        Self {
            total_products: products.len(),
            categories: categories.len(),
            verified_sellers: products.iter().filter(|p| p.seller.verified).count(),
        }
    }
}

async fn stats(State(state): State<StorefrontState>, headers: HeaderMap) -> ApiResult<CatalogStats> {
    let products = state
        .products()?
        .find(tenant_from_headers(&headers), StoreParams::internal())
        .await?
        .into_iter()
        .map(Product::from_value)
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Json(CatalogStats::from_products(&products)))
}

async fn seed(State(state): State<StorefrontState>, headers: HeaderMap) -> ApiResult<SeedSummary> {
    let summary = seed_catalog(state.documents.as_ref(), &tenant_from_headers(&headers)).await?;
    Ok(Json(summary))
}

/// Deletes every product through the products service, so gallery blobs go too.
async fn clear_products(State(state): State<StorefrontState>, headers: HeaderMap) -> ApiResult<Value> {
    let tenant = tenant_from_headers(&headers);
    let products = state.products()?;

    let mut deleted = 0usize;
    for product in products.find(tenant.clone(), StoreParams::internal()).await? {
        let Some(id) = product.get("id").and_then(Value::as_str) else {
            continue;
        };
        products.remove(tenant.clone(), id, StoreParams::internal()).await?;
        deleted += 1;
    }

    tracing::info!(tenant = tenant.tenant_id.as_str(), deleted, "all products deleted");
    Ok(Json(json!({
        "deleted": deleted,
        "message": format!("Successfully deleted {deleted} products from the database."),
    })))
}

pub fn router(state: StorefrontState) -> Router<()> {
    Router::new()
        .route("/stats", get(stats))
        .route("/seed", post(seed))
        .route("/products", delete(clear_products))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::seed_products;

    #[test]
    fn stats_over_the_sample_catalog() {
        let products: Vec<Product> = seed_products()
            .into_iter()
            .map(|v| Product::from_value(v).unwrap())
            .collect();

        assert_eq!(
            CatalogStats::from_products(&products),
            CatalogStats {
                total_products: 6,
                categories: 2,
                verified_sellers: 6,
            }
        );
    }
}
