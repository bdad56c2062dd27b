use async_trait::async_trait;
use bytes::Bytes;

use crate::{BlobError, BlobResult, DeleteOutcome, OpenedBlob, ProgressSink};

/// Storage primitives every backend implements.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `body` under `key`, reporting progress per transferred chunk.
    async fn put(
        &self,
        key: &str,
        content_type: Option<&str>,
        body: Bytes,
        progress: &ProgressSink,
    ) -> BlobResult<PutResult>;

    async fn get(&self, key: &str) -> BlobResult<OpenedBlob>;

    /// Deleting a missing key is reported, not treated as an error.
    async fn delete(&self, key: &str) -> BlobResult<DeleteOutcome>;

    /// URL under which `key` is publicly readable.
    fn public_url(&self, key: &str) -> String;
}

/// Result of a successful put operation
#[derive(Debug, Clone)]
pub struct PutResult {
    pub size_bytes: u64,
    pub etag: Option<String>,
}

/// Strategy for generating blob keys
pub trait BlobKeyStrategy: Send + Sync {
    fn object_key(&self, owner_id: &str, file_name: &str, timestamp_ms: i64) -> String;
}

/// `products/{productId}/{timestampMillis}_{fileName}`
#[derive(Debug, Clone, Default)]
pub struct ProductImageKeys;

impl BlobKeyStrategy for ProductImageKeys {
    fn object_key(&self, owner_id: &str, file_name: &str, timestamp_ms: i64) -> String {
        format!(
            "products/{}/{}_{}",
            owner_id,
            timestamp_ms,
            sanitize_file_name(file_name)
        )
    }
}

/// Path separators would let a file name escape its product folder.
pub fn sanitize_file_name(file_name: &str) -> String {
    file_name.replace(['/', '\\'], "_")
}

/// Rejects keys a store must never touch.
pub fn validate_key(key: &str) -> BlobResult<()> {
    if key.is_empty() {
        return Err(BlobError::invalid("blob key must not be empty"));
    }
    if key.starts_with('/') || key.contains('\\') {
        return Err(BlobError::invalid(format!("blob key must be relative: {key}")));
    }
    if key.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..") {
        return Err(BlobError::invalid(format!("blob key has an invalid segment: {key}")));
    }
    Ok(())
}

/// Joins a public base URL and a key with exactly one slash.
pub fn join_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key.trim_start_matches('/'))
}
