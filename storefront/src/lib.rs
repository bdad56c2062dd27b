//! Machines & More: a marketplace for machinery, vehicles and parts.
//!
//! Products and purchase requests are REST services on the mart stack.
//! Around them sit the catalog pages, the back office, and the gallery
//! editor that uploads product images before a product exists.

pub mod admin;
mod app;
pub mod catalog;
pub mod config;
pub mod format;
pub mod gallery;
mod hooks;
pub mod models;
pub mod seed;
pub mod services;
pub mod state;
pub mod store;
pub mod validation;

use std::sync::Arc;

use anyhow::Result;
use mart_axum::AxumApp;
use mart_blob::{BlobAdapter, BlobStore, FsBlobStore, MemoryBlobStore};
use mart_core::TenantContext;
use mart_gallery::{BlobClient, UploadOrchestrator};
use serde_json::Value;

pub use config::StorefrontConfig;
pub use services::StoreParams;
pub use state::StorefrontState;

use crate::store::{DocumentStore, MemoryDocumentStore};

/// Replacements for the pieces `build` would pick itself.
#[derive(Default)]
pub struct BuildOptions {
    overrides: Vec<(String, String)>,
    blob_store: Option<Arc<dyn BlobStore>>,
    documents: Option<Arc<dyn DocumentStore>>,
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Config value applied after defaults and the environment.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.push((key.into(), value.into()));
        self
    }

    pub fn blob_store(mut self, store: Arc<dyn BlobStore>) -> Self {
        self.blob_store = Some(store);
        self
    }

    pub fn document_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.documents = Some(store);
        self
    }
}

pub async fn build() -> Result<AxumApp<Value, StoreParams>> {
    build_with(BuildOptions::new()).await
}

pub async fn build_with(options: BuildOptions) -> Result<AxumApp<Value, StoreParams>> {
    let ax = app::storefront_app(&options.overrides)?;
    let config = Arc::new(StorefrontConfig::from_snapshot(&ax.app.config_snapshot()));

    let blob_store: Arc<dyn BlobStore> = match (options.blob_store, &config.blob_root_dir) {
        (Some(store), _) => store,
        (None, Some(root)) => {
            tracing::info!(root = %root.display(), "storing images on disk");
            Arc::new(FsBlobStore::new(root.clone(), &config.blob))
        }
        (None, None) => Arc::new(MemoryBlobStore::new(&config.blob)),
    };
    let blobs = Arc::new(BlobAdapter::new(blob_store, config.blob.clone()));
    let blob_client: Arc<dyn BlobClient> = blobs.clone();

    let documents: Arc<dyn DocumentStore> = options
        .documents
        .unwrap_or_else(|| Arc::new(MemoryDocumentStore::new()));

    let svcs = services::configure(ax.app.as_ref(), Arc::clone(&documents), Arc::clone(&blob_client))?;

    if config.seed_on_start {
        seed::seed_catalog(documents.as_ref(), &TenantContext::default()).await?;
    }

    let state = StorefrontState {
        app: Arc::clone(&ax.app),
        documents,
        blobs,
        uploads: UploadOrchestrator::new(blob_client),
        config,
    };

    let ax = ax
        .use_service("/products", svcs.products)
        .use_service("/purchase-requests", svcs.purchase_requests)
        .use_router("/catalog", catalog::routes::router(state.clone()))
        .use_router("/admin", admin::router(state.clone()))
        .use_router("/gallery", gallery::router(state.clone()))
        .merge(gallery::media_router(state))
        .service("/health", || async { "ok" })
        .with_default_layers();

    Ok(ax)
}
