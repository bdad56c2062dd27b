use std::sync::Arc;

use mart_core::{MartApp, MartService};
use mart_gallery::BlobClient;
use serde_json::Value;

use crate::store::DocumentStore;

pub mod products;
pub mod purchase_requests;

pub type StoreParams = mart_axum::params::RestParams;

pub struct StorefrontServices {
    pub products: Arc<dyn MartService<Value, StoreParams>>,
    pub purchase_requests: Arc<dyn MartService<Value, StoreParams>>,
}

/// Builds both services and registers their hooks. Mounting them on the
/// router registers them on `app`.
pub fn configure(
    app: &MartApp<Value, StoreParams>,
    documents: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobClient>,
) -> anyhow::Result<StorefrontServices> {
    let products: Arc<dyn MartService<Value, StoreParams>> = Arc::new(products::ProductsService::new(
        Arc::clone(&documents),
        blobs,
    ));
    app.register_service("products", Arc::clone(&products));
    products::products_shared::register_hooks(app, Arc::clone(&documents))?;

    let purchase_requests: Arc<dyn MartService<Value, StoreParams>> = Arc::new(
        purchase_requests::PurchaseRequestsService::new(Arc::clone(&documents)),
    );
    app.register_service("purchase-requests", Arc::clone(&purchase_requests));
    purchase_requests::purchase_requests_shared::register_hooks(app, documents)?;

    Ok(StorefrontServices {
        products,
        purchase_requests,
    })
}
