use std::sync::Arc;

use mart_core::{MartApp, ServiceCapabilities, ServiceMethodKind};
use serde_json::Value;

use crate::services::StoreParams;
use crate::store::DocumentStore;

use super::purchase_requests_hooks::{SuggestReply, ValidatePurchaseRequest};

pub const SCHEMA_ERROR: &str = "Purchase request validation failed";

/// Requests are append-only: no patch, no remove.
pub fn capabilities() -> ServiceCapabilities {
    ServiceCapabilities::from_methods(vec![
        ServiceMethodKind::Create,
        ServiceMethodKind::Find,
        ServiceMethodKind::Get,
    ])
}

pub fn register_hooks(app: &MartApp<Value, StoreParams>, store: Arc<dyn DocumentStore>) -> anyhow::Result<()> {
    app.service("purchase-requests")?.hooks(|h| {
        h.before_create(Arc::new(ValidatePurchaseRequest { store }));
        h.before_create(Arc::new(SuggestReply));
    });
    Ok(())
}
