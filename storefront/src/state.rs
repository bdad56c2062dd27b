use std::sync::Arc;

use anyhow::Result;
use mart_blob::BlobAdapter;
use mart_core::{MartApp, ServiceHandle};
use mart_gallery::{BlobClient, UploadOrchestrator};
use serde_json::Value;

use crate::config::StorefrontConfig;
use crate::services::StoreParams;
use crate::store::DocumentStore;

/// Shared state of the routes that sit outside the REST services.
#[derive(Clone)]
pub struct StorefrontState {
    pub app: Arc<MartApp<Value, StoreParams>>,
    pub documents: Arc<dyn DocumentStore>,
    pub blobs: Arc<BlobAdapter>,
    pub uploads: UploadOrchestrator<dyn BlobClient>,
    pub config: Arc<StorefrontConfig>,
}

impl StorefrontState {
    pub fn products(&self) -> Result<ServiceHandle<Value, StoreParams>> {
        self.app.service("products")
    }
}
