use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;

use crate::store::{join_url, validate_key, BlobStore, PutResult};
use crate::{BlobConfig, BlobError, BlobResult, DeleteOutcome, OpenedBlob, ProgressSink};

#[derive(Debug, Clone)]
struct MemoryObject {
    body: Bytes,
    content_type: Option<String>,
}

/// Process-local blob store.
///
/// Transfers are chunked like a network upload so progress behaves the
/// same as with a real backend. Keys containing a rejected fragment fail
/// after their first chunk, which lets callers exercise failure paths.
pub struct MemoryBlobStore {
    objects: RwLock<HashMap<String, MemoryObject>>,
    rejected: RwLock<Vec<String>>,
    chunk_size: usize,
    public_base_url: String,
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new(&BlobConfig::default())
    }
}

impl MemoryBlobStore {
    pub fn new(config: &BlobConfig) -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            rejected: RwLock::new(Vec::new()),
            chunk_size: config.chunk_size.max(1),
            public_base_url: config.public_base_url.clone(),
        }
    }

    /// Fail every future put whose key contains `fragment`.
    pub fn reject_keys_containing(self, fragment: impl Into<String>) -> Self {
        self.rejected.write().push(fragment.into());
        self
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.read().contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    fn is_rejected(&self, key: &str) -> bool {
        self.rejected.read().iter().any(|frag| key.contains(frag.as_str()))
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(
        &self,
        key: &str,
        content_type: Option<&str>,
        body: Bytes,
        progress: &ProgressSink,
    ) -> BlobResult<PutResult> {
        validate_key(key)?;

        let total = body.len() as u64;
        let rejected = self.is_rejected(key);
        let mut transferred = 0u64;

        if body.is_empty() {
            progress.report(0, 0);
        }

        for chunk in body.chunks(self.chunk_size) {
            transferred += chunk.len() as u64;
            progress.report(transferred, total);

            if rejected {
                return Err(BlobError::upload_failed(format!(
                    "transfer of {key} interrupted after {transferred} bytes"
                )));
            }
            tokio::task::yield_now().await;
        }

        if rejected {
            return Err(BlobError::upload_failed(format!("transfer of {key} rejected")));
        }

        self.objects.write().insert(
            key.to_string(),
            MemoryObject {
                body,
                content_type: content_type.map(str::to_string),
            },
        );

        Ok(PutResult {
            size_bytes: total,
            etag: None,
        })
    }

    async fn get(&self, key: &str) -> BlobResult<OpenedBlob> {
        let objects = self.objects.read();
        let obj = objects.get(key).ok_or_else(|| BlobError::not_found(key))?;
        Ok(OpenedBlob {
            path: key.to_string(),
            body: obj.body.clone(),
            content_type: obj.content_type.clone(),
        })
    }

    async fn delete(&self, key: &str) -> BlobResult<DeleteOutcome> {
        validate_key(key)?;
        Ok(match self.objects.write().remove(key) {
            Some(_) => DeleteOutcome::Deleted,
            None => DeleteOutcome::NotFound,
        })
    }

    fn public_url(&self, key: &str) -> String {
        join_url(&self.public_base_url, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TransferProgress;

    fn store(chunk: usize) -> MemoryBlobStore {
        MemoryBlobStore::new(&BlobConfig::new().with_chunk_size(chunk))
    }

    #[tokio::test]
    async fn put_reports_progress_per_chunk() {
        let store = store(4);
        let (sink, mut rx) = ProgressSink::channel();

        let res = store
            .put("products/p1/1_a.jpg", Some("image/jpeg"), Bytes::from_static(b"0123456789"), &sink)
            .await
            .unwrap();
        drop(sink);

        assert_eq!(res.size_bytes, 10);
        let mut seen = Vec::new();
        while let Some(p) = rx.recv().await {
            seen.push(p);
        }
        assert_eq!(
            seen,
            vec![
                TransferProgress::new(4, 10),
                TransferProgress::new(8, 10),
                TransferProgress::new(10, 10),
            ]
        );

        let opened = store.get("products/p1/1_a.jpg").await.unwrap();
        assert_eq!(&opened.body[..], b"0123456789");
        assert_eq!(opened.content_type.as_deref(), Some("image/jpeg"));
    }

    #[tokio::test]
    async fn rejected_keys_fail_mid_transfer_and_store_nothing() {
        let store = store(2).reject_keys_containing("broken");
        let err = store
            .put("products/p1/1_broken.png", None, Bytes::from_static(b"abcdef"), &ProgressSink::noop())
            .await
            .unwrap_err();

        assert!(matches!(err, BlobError::UploadFailed { .. }));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = store(8);
        store
            .put("products/p1/1_a.jpg", None, Bytes::from_static(b"x"), &ProgressSink::noop())
            .await
            .unwrap();

        assert_eq!(store.delete("products/p1/1_a.jpg").await.unwrap(), DeleteOutcome::Deleted);
        assert_eq!(store.delete("products/p1/1_a.jpg").await.unwrap(), DeleteOutcome::NotFound);
        assert!(matches!(store.get("products/p1/1_a.jpg").await, Err(BlobError::NotFound { .. })));
    }

    #[test]
    fn public_url_uses_configured_base() {
        let store = MemoryBlobStore::new(&BlobConfig::new().with_public_base_url("https://cdn.example.com/"));
        assert_eq!(
            store.public_url("products/p1/1_a.jpg"),
            "https://cdn.example.com/products/p1/1_a.jpg"
        );
    }
}
