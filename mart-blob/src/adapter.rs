use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::Utc;

use crate::{
    BlobConfig, BlobError, BlobKeyStrategy, BlobResult, BlobStore, BlobUpload, DeleteOutcome,
    OpenedBlob, ProductImageKeys, ProgressSink, StoredBlob,
};

/// Product image storage as services see it.
///
/// Wraps a [`BlobStore`] with key naming, size limits and logging.
pub struct BlobAdapter {
    store: Arc<dyn BlobStore>,
    keys: Arc<dyn BlobKeyStrategy>,
    config: BlobConfig,
    last_timestamp: AtomicI64,
}

impl BlobAdapter {
    pub fn new(store: Arc<dyn BlobStore>, config: BlobConfig) -> Self {
        Self {
            store,
            keys: Arc::new(ProductImageKeys),
            config,
            last_timestamp: AtomicI64::new(0),
        }
    }

    /// Wall-clock millis, bumped past the previous key's stamp so two files
    /// with the same name never share a key.
    fn next_timestamp(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let prev = self
            .last_timestamp
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(now.max(last + 1)))
            .unwrap_or_else(|last| last);
        now.max(prev + 1)
    }

    /// Store one image for `owner_id` (a product id or a draft id).
    pub async fn upload(
        &self,
        owner_id: &str,
        upload: BlobUpload,
        progress: &ProgressSink,
    ) -> BlobResult<StoredBlob> {
        let owner_id = owner_id.trim();
        if owner_id.is_empty() || owner_id.contains('/') {
            return Err(BlobError::invalid(format!("invalid upload destination: {owner_id:?}")));
        }
        if upload.file_name.trim().is_empty() {
            return Err(BlobError::invalid("file name must not be empty"));
        }

        let size = upload.size_bytes();
        if size > self.config.max_blob_bytes {
            return Err(BlobError::invalid(format!(
                "{} is {} bytes, the limit is {}",
                upload.file_name, size, self.config.max_blob_bytes
            )));
        }

        let key = self
            .keys
            .object_key(owner_id, &upload.file_name, self.next_timestamp());

        tracing::debug!(%key, size, "uploading blob");
        let put = self
            .store
            .put(&key, upload.content_type.as_deref(), upload.body, progress)
            .await?;

        let stored = StoredBlob {
            url: self.store.public_url(&key),
            path: key,
            size_bytes: put.size_bytes,
            content_type: upload.content_type,
        };
        tracing::info!(path = %stored.path, bytes = stored.size_bytes, "blob stored");
        Ok(stored)
    }

    pub async fn open(&self, path: &str) -> BlobResult<OpenedBlob> {
        self.store.get(path).await
    }

    pub async fn delete(&self, path: &str) -> BlobResult<DeleteOutcome> {
        let outcome = self.store.delete(path).await?;
        tracing::debug!(path, ?outcome, "blob delete");
        Ok(outcome)
    }
}
