use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use mart_core::{BeforeHook, HookContext, MartError};
use serde_json::{json, Value};

use crate::models::{NewPurchaseRequest, PurchaseRequest, ResponseSource};
use crate::services::StoreParams;
use crate::store::{DocumentStore, PRODUCTS};
use crate::validation::validate;

use super::purchase_requests_shared::SCHEMA_ERROR;
use super::reply_template::{ReplyDetails, ReplyTemplate};

/// Validates the form and fills in `productName` from the product when the
/// client left it out.
pub struct ValidatePurchaseRequest {
    pub store: Arc<dyn DocumentStore>,
}

#[async_trait]
impl BeforeHook<Value, StoreParams> for ValidatePurchaseRequest {
    async fn run(&self, ctx: &mut HookContext<Value, StoreParams>) -> Result<()> {
        let data = ctx
            .data
            .as_ref()
            .ok_or_else(|| MartError::bad_request("Request body is required").into_anyhow())?;
        let input: NewPurchaseRequest = validate(data, SCHEMA_ERROR)?;

        let product_id = input.product_id.trim().to_string();
        let product_name = match input.product_name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => {
                let product = self
                    .store
                    .get(&ctx.tenant, PRODUCTS, &product_id)
                    .await?
                    .ok_or_else(|| {
                        MartError::not_found(format!("Product not found: {product_id}")).into_anyhow()
                    })?;
                product
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            }
        };

        let mut out = json!({
            "productId": product_id,
            "productName": product_name,
            "customerName": input.customer_name.trim(),
            "phoneNumber": input.phone_number.trim(),
            "location": input.location.trim(),
        });
        if let Some(notes) = input.notes.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            out["notes"] = Value::String(notes.to_string());
        }

        ctx.data = Some(out);
        Ok(())
    }
}

/// Attaches the templated reply and stamps the record.
pub struct SuggestReply;

#[async_trait]
impl BeforeHook<Value, StoreParams> for SuggestReply {
    async fn run(&self, ctx: &mut HookContext<Value, StoreParams>) -> Result<()> {
        let Some(data) = ctx.data.take() else {
            return Ok(());
        };
        let text = |key: &str| data.get(key).and_then(Value::as_str).unwrap_or_default().to_string();

        let template = ReplyTemplate::from_config(&ctx.config);
        let notes = data.get("notes").and_then(Value::as_str).map(str::to_string);
        let suggested_response = template.render(&ReplyDetails {
            customer_name: &text("customerName"),
            product_name: &text("productName"),
            phone_number: &text("phoneNumber"),
            location: &text("location"),
            notes: notes.as_deref(),
        });

        let record = PurchaseRequest {
            id: String::new(),
            product_id: text("productId"),
            product_name: text("productName"),
            customer_name: text("customerName"),
            phone_number: text("phoneNumber"),
            location: text("location"),
            notes,
            suggested_response,
            response_source: ResponseSource::Template,
            created_at: crate::format::timestamp(),
        };

        ctx.data = Some(serde_json::to_value(record)?);
        Ok(())
    }
}
