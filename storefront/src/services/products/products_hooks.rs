use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use mart_core::{BeforeHook, HookContext, MartError};
use serde_json::{json, Value};

use crate::models::{NewProduct, PatchProduct};
use crate::services::StoreParams;
use crate::store::{DocumentStore, Query, PRODUCTS};
use crate::validation::validate;

use super::products_shared::SCHEMA_ERROR;

fn require_data(ctx: &HookContext<Value, StoreParams>) -> Result<&Value> {
    ctx.data.as_ref().ok_or_else(|| {
        MartError::bad_request("Request body is required").into_anyhow()
    })
}

/// Turns the create body into the stored record shape.
pub struct ValidateNewProduct;

#[async_trait]
impl BeforeHook<Value, StoreParams> for ValidateNewProduct {
    async fn run(&self, ctx: &mut HookContext<Value, StoreParams>) -> Result<()> {
        let input: NewProduct = validate(require_data(ctx)?, SCHEMA_ERROR)?;
        let record = input.into_record(crate::format::timestamp());

        if record.slug.is_empty() {
            return Err(MartError::unprocessable(SCHEMA_ERROR)
                .with_errors(json!({"name": ["name must contain letters or digits"]}))
                .into_anyhow());
        }

        ctx.data = Some(serde_json::to_value(record)?);
        Ok(())
    }
}

/// Slugs address product pages, so two products may not share one.
pub struct EnsureUniqueSlug {
    pub store: Arc<dyn DocumentStore>,
}

#[async_trait]
impl BeforeHook<Value, StoreParams> for EnsureUniqueSlug {
    async fn run(&self, ctx: &mut HookContext<Value, StoreParams>) -> Result<()> {
        let Some(slug) = ctx
            .data
            .as_ref()
            .and_then(|d| d.get("slug"))
            .and_then(Value::as_str)
            .map(str::to_string)
        else {
            return Ok(());
        };

        let query = Query::new().where_eq("slug", slug.as_str()).limit(1);
        let existing = self.store.query(&ctx.tenant, PRODUCTS, &query).await?;
        if !existing.is_empty() {
            return Err(MartError::conflict(format!("A product with slug '{slug}' already exists"))
                .with_data(json!({"slug": slug}))
                .into_anyhow());
        }
        Ok(())
    }
}

pub struct ValidateProductPatch;

#[async_trait]
impl BeforeHook<Value, StoreParams> for ValidateProductPatch {
    async fn run(&self, ctx: &mut HookContext<Value, StoreParams>) -> Result<()> {
        let patch: PatchProduct = validate(require_data(ctx)?, SCHEMA_ERROR)?;
        ctx.data = Some(serde_json::to_value(patch.normalized())?);
        Ok(())
    }
}
