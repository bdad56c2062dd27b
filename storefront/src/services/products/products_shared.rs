use std::sync::Arc;

use mart_core::{MartApp, ServiceCapabilities, ServiceMethodKind};
use serde_json::Value;

use crate::services::StoreParams;
use crate::store::DocumentStore;

use super::products_hooks::{EnsureUniqueSlug, ValidateNewProduct, ValidateProductPatch};

pub const SCHEMA_ERROR: &str = "Products schema validation failed";

pub fn crud_capabilities() -> ServiceCapabilities {
    ServiceCapabilities::from_methods(vec![
        ServiceMethodKind::Create,
        ServiceMethodKind::Find,
        ServiceMethodKind::Get,
        ServiceMethodKind::Patch,
        ServiceMethodKind::Remove,
    ])
}

pub fn register_hooks(app: &MartApp<Value, StoreParams>, store: Arc<dyn DocumentStore>) -> anyhow::Result<()> {
    app.service("products")?.hooks(|h| {
        h.before_create(Arc::new(ValidateNewProduct));
        h.before_create(Arc::new(EnsureUniqueSlug { store }));
        h.before_patch(Arc::new(ValidateProductPatch));
    });
    Ok(())
}
