use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use mart_axum::{tenant_from_headers, MartAxumError};
use mart_core::{MartError, TenantContext};
use serde_json::{json, Value};

use crate::models::{Condition, LabelledOption, Product, StockStatus, CATEGORIES, GHANA_REGIONS};
use crate::services::StoreParams;
use crate::state::StorefrontState;

use super::browse::{featured, BrowseResult, CatalogView};
use super::detail::ProductDetail;

type ApiResult<T> = Result<Json<T>, MartAxumError>;

async fn listing(state: &StorefrontState, tenant: TenantContext, params: StoreParams) -> anyhow::Result<Vec<Product>> {
    state
        .products()?
        .find(tenant, params)
        .await?
        .into_iter()
        .map(Product::from_value)
        .collect()
}

async fn categories() -> Json<Value> {
    Json(json!(CATEGORIES))
}

async fn options() -> Json<Value> {
    let stock: Vec<LabelledOption> = StockStatus::ALL
        .iter()
        .map(|s| LabelledOption {
            value: s.value().to_string(),
            label: s.label().to_string(),
            description: None,
        })
        .collect();
    let conditions: Vec<LabelledOption> = Condition::ALL
        .iter()
        .map(|c| LabelledOption {
            value: c.value().to_string(),
            label: c.label().to_string(),
            description: Some(c.description().to_string()),
        })
        .collect();

    Json(json!({
        "regions": GHANA_REGIONS,
        "stockStatuses": stock,
        "conditions": conditions,
    }))
}

async fn featured_products(State(state): State<StorefrontState>, headers: HeaderMap) -> ApiResult<Vec<Product>> {
    let products = listing(&state, tenant_from_headers(&headers), StoreParams::internal()).await?;
    Ok(Json(featured(&products)))
}

async fn browse(
    State(state): State<StorefrontState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<BrowseResult> {
    let products = listing(&state, tenant_from_headers(&headers), StoreParams::internal()).await?;

    let view = CatalogView::new(products)
        .with_category(query.get("category").cloned())
        .with_search(query.get("q").cloned().unwrap_or_default());

    Ok(Json(view.into_result()))
}

async fn product_page(
    State(state): State<StorefrontState>,
    headers: HeaderMap,
    Path(slug): Path<String>,
) -> ApiResult<ProductDetail> {
    let params = StoreParams::internal().with_query("slug", slug.as_str());
    let product = listing(&state, tenant_from_headers(&headers), params)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| MartError::not_found(format!("No product at /products/{slug}")))?;

    Ok(Json(ProductDetail::from(product)))
}

pub fn router(state: StorefrontState) -> Router<()> {
    Router::new()
        .route("/categories", get(categories))
        .route("/options", get(options))
        .route("/featured", get(featured_products))
        .route("/browse", get(browse))
        .route("/products/{slug}", get(product_page))
        .with_state(state)
}
