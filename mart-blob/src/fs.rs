use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncWriteExt;

use crate::store::{join_url, validate_key, BlobStore, PutResult};
use crate::{BlobConfig, BlobError, BlobResult, DeleteOutcome, OpenedBlob, ProgressSink};

/// Blob store rooted at a local directory.
///
/// Writes go to `{file}.part` first and are renamed into place once the
/// last chunk is flushed, so readers never see a half-written image.
pub struct FsBlobStore {
    root: PathBuf,
    chunk_size: usize,
    public_base_url: String,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>, config: &BlobConfig) -> Self {
        Self {
            root: root.into(),
            chunk_size: config.chunk_size.max(1),
            public_base_url: config.public_base_url.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> BlobResult<PathBuf> {
        validate_key(key)?;
        Ok(key.split('/').fold(self.root.clone(), |path, seg| path.join(seg)))
    }

    async fn write_staging(&self, staging: &Path, key: &str, body: &Bytes, progress: &ProgressSink) -> BlobResult<()> {
        let total = body.len() as u64;
        let mut transferred = 0u64;

        let mut file = tokio::fs::File::create(staging).await?;
        if body.is_empty() {
            progress.report(0, 0);
        }
        for chunk in body.chunks(self.chunk_size) {
            file.write_all(chunk)
                .await
                .map_err(|err| BlobError::upload_failed(format!("writing {key}: {err}")))?;
            transferred += chunk.len() as u64;
            progress.report(transferred, total);
        }
        file.flush().await?;
        file.sync_all().await?;
        Ok(())
    }
}

/// `x.jpg` stages as `x.jpg.part`, so `x.png` never shares its staging file.
fn staging_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().map(OsString::from).unwrap_or_default();
    name.push(".part");
    target.with_file_name(name)
}

/// Content type from the file extension, for images the storefront serves.
pub fn guess_content_type(key: &str) -> Option<&'static str> {
    let ext = key.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "avif" => Some("image/avif"),
        "svg" => Some("image/svg+xml"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(
        &self,
        key: &str,
        _content_type: Option<&str>,
        body: Bytes,
        progress: &ProgressSink,
    ) -> BlobResult<PutResult> {
        let target = self.resolve(key)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let staging = staging_path(&target);
        let total = body.len() as u64;

        let written = match self.write_staging(&staging, key, &body, progress).await {
            Ok(()) => tokio::fs::rename(&staging, &target).await.map_err(BlobError::from),
            Err(err) => Err(err),
        };
        if let Err(err) = written {
            if let Err(cleanup) = tokio::fs::remove_file(&staging).await {
                if cleanup.kind() != ErrorKind::NotFound {
                    tracing::warn!(key, error = %cleanup, "could not remove staging file");
                }
            }
            return Err(err);
        }
        tracing::debug!(key, bytes = total, "blob written");

        Ok(PutResult {
            size_bytes: total,
            etag: None,
        })
    }

    async fn get(&self, key: &str) -> BlobResult<OpenedBlob> {
        let path = self.resolve(key)?;
        match tokio::fs::read(&path).await {
            Ok(body) => Ok(OpenedBlob {
                path: key.to_string(),
                body: Bytes::from(body),
                content_type: guess_content_type(key).map(str::to_string),
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(BlobError::not_found(key)),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete(&self, key: &str) -> BlobResult<DeleteOutcome> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(DeleteOutcome::Deleted),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(DeleteOutcome::NotFound),
            Err(err) => Err(err.into()),
        }
    }

    fn public_url(&self, key: &str) -> String {
        join_url(&self.public_base_url, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_delete_roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path(), &BlobConfig::new().with_chunk_size(3));
        let (sink, mut rx) = ProgressSink::channel();

        store
            .put("products/p1/1_a.png", Some("image/png"), Bytes::from_static(b"pngdata"), &sink)
            .await
            .unwrap();
        drop(sink);

        let mut last = None;
        let mut reports = 0;
        while let Some(p) = rx.recv().await {
            reports += 1;
            last = Some(p.percent());
        }
        assert_eq!(reports, 3);
        assert_eq!(last, Some(100));

        assert!(dir.path().join("products").join("p1").join("1_a.png").is_file());
        assert!(!dir.path().join("products").join("p1").join("1_a.png.part").exists());

        let opened = store.get("products/p1/1_a.png").await.unwrap();
        assert_eq!(&opened.body[..], b"pngdata");
        assert_eq!(opened.content_type.as_deref(), Some("image/png"));

        assert_eq!(store.delete("products/p1/1_a.png").await.unwrap(), DeleteOutcome::Deleted);
        assert_eq!(store.delete("products/p1/1_a.png").await.unwrap(), DeleteOutcome::NotFound);
    }

    #[test]
    fn staging_keeps_the_extension() {
        let jpg = staging_path(Path::new("/blobs/products/p1/1_x.jpg"));
        let png = staging_path(Path::new("/blobs/products/p1/1_x.png"));
        assert_eq!(jpg, PathBuf::from("/blobs/products/p1/1_x.jpg.part"));
        assert_ne!(jpg, png);
    }

    #[tokio::test]
    async fn failed_rename_leaves_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path(), &BlobConfig::default());
        let target = dir.path().join("products").join("p1").join("1_a.jpg");
        std::fs::create_dir_all(target.join("occupied")).unwrap();

        let err = store
            .put("products/p1/1_a.jpg", None, Bytes::from_static(b"jpeg"), &ProgressSink::noop())
            .await
            .unwrap_err();
        assert!(matches!(err, BlobError::Io { .. }));
        assert!(!dir.path().join("products").join("p1").join("1_a.jpg.part").exists());
    }

    #[tokio::test]
    async fn traversal_keys_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path(), &BlobConfig::default());
        let err = store.get("../outside.jpg").await.unwrap_err();
        assert!(matches!(err, BlobError::Invalid { .. }));
    }

    #[test]
    fn content_types_from_extension() {
        assert_eq!(guess_content_type("products/demo/excavator-1.JPG"), Some("image/jpeg"));
        assert_eq!(guess_content_type("products/p/1_x.webp"), Some("image/webp"));
        assert_eq!(guess_content_type("products/p/1_noext"), None);
    }
}
