//! Optimistic, sequential gallery uploads.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use mart_blob::{BlobAdapter, BlobError, BlobUpload, DeleteOutcome, ProgressSink, StoredBlob};
use serde::Serialize;
use uuid::Uuid;

use crate::entry::ImageEntry;
use crate::error::GalleryResult;
use crate::reorder::{remove_at, renumber};

/// The blob operations the gallery needs.
#[async_trait]
pub trait BlobClient: Send + Sync {
    /// Upload `file` for `destination_id`, reporting progress into `progress`.
    async fn upload(
        &self,
        destination_id: &str,
        file: &FileHandle,
        progress: ProgressSink,
    ) -> Result<StoredBlob, BlobError>;

    async fn delete(&self, path: &str) -> Result<DeleteOutcome, BlobError>;
}

#[async_trait]
impl BlobClient for BlobAdapter {
    async fn upload(
        &self,
        destination_id: &str,
        file: &FileHandle,
        progress: ProgressSink,
    ) -> Result<StoredBlob, BlobError> {
        let mut upload = BlobUpload::new(file.name.clone(), file.bytes.clone());
        upload.content_type = file.content_type.clone();
        BlobAdapter::upload(self, destination_id, upload, &progress).await
    }

    async fn delete(&self, path: &str) -> Result<DeleteOutcome, BlobError> {
        BlobAdapter::delete(self, path).await
    }
}

/// A file picked by the user, not yet uploaded.
#[derive(Debug, Clone)]
pub struct FileHandle {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
    preview: String,
}

impl FileHandle {
    pub fn new(name: impl Into<String>, content_type: Option<String>, bytes: impl Into<Bytes>) -> Self {
        let name = name.into();
        let preview = format!("local-preview://{}/{}", Uuid::new_v4().simple(), name);
        Self {
            name,
            content_type,
            bytes: bytes.into(),
            preview,
        }
    }

    /// Unique local reference shown until the upload completes.
    pub fn preview(&self) -> &str {
        &self.preview
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedUpload {
    pub file_name: String,
    pub reason: String,
}

/// Outcome of one `submit_files` batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReport {
    pub gallery: Vec<ImageEntry>,
    pub uploaded: Vec<String>,
    pub failed: Vec<FailedUpload>,
    pub updates: usize,
}

/// Drives a batch of files into a gallery, one upload at a time.
///
/// The gallery belongs to the caller: it goes in as an argument, every
/// intermediate state is handed to `on_update`, and the final state comes
/// back in the report.
pub struct UploadOrchestrator<C: ?Sized> {
    client: Arc<C>,
}

impl<C: ?Sized> Clone for UploadOrchestrator<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
        }
    }
}

impl<C> UploadOrchestrator<C>
where
    C: BlobClient + ?Sized,
{
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// Appends a placeholder per file, then uploads the queue in order.
    ///
    /// A finished upload turns its placeholder into a remote image in
    /// place. A failed one drops its placeholder and renumbers the gallery.
    /// Failures are logged and reported, never returned as errors.
    pub async fn submit_files<F>(
        &self,
        current: Vec<ImageEntry>,
        files: Vec<FileHandle>,
        destination_id: &str,
        mut on_update: F,
    ) -> UploadReport
    where
        F: FnMut(&[ImageEntry]) + Send,
    {
        let mut gallery = current;
        renumber(&mut gallery);

        let mut report = UploadReport {
            gallery: Vec::new(),
            uploaded: Vec::new(),
            failed: Vec::new(),
            updates: 0,
        };

        if files.is_empty() {
            report.gallery = gallery;
            return report;
        }

        let base = gallery.len();
        gallery.extend(
            files
                .iter()
                .enumerate()
                .map(|(i, file)| ImageEntry::placeholder(file.preview(), base + i)),
        );
        on_update(&gallery);
        report.updates += 1;

        let mut queue: VecDeque<FileHandle> = files.into();
        while let Some(file) = queue.pop_front() {
            // earlier failures shift positions, so find the placeholder by identity
            let Some(index) = gallery.iter().position(|e| e.is_placeholder_for(file.preview())) else {
                continue;
            };

            let (sink, mut progress) = ProgressSink::channel();
            let outcome = {
                let upload = self.client.upload(destination_id, &file, sink);
                tokio::pin!(upload);

                loop {
                    tokio::select! {
                        biased;
                        Some(tick) = progress.recv() => {
                            if gallery[index].set_progress(tick.percent()) {
                                tracing::debug!(file = %file.name, percent = tick.percent(), "upload progress");
                                on_update(&gallery);
                                report.updates += 1;
                            }
                        }
                        result = &mut upload => break result,
                    }
                }
            };

            match outcome {
                Ok(stored) => {
                    tracing::info!(file = %file.name, path = %stored.path, "image uploaded");
                    gallery[index].finish(stored.url, stored.path);
                    report.uploaded.push(file.name);
                }
                Err(err) => {
                    tracing::warn!(file = %file.name, error = %err, "image upload failed, dropping placeholder");
                    gallery.remove(index);
                    renumber(&mut gallery);
                    report.failed.push(FailedUpload {
                        file_name: file.name,
                        reason: err.to_string(),
                    });
                }
            }
            on_update(&gallery);
            report.updates += 1;
        }

        report.gallery = gallery;
        report
    }

    /// Removes the image at `index`, deleting its blob when it has one.
    ///
    /// A failed delete is logged and does not keep the image in the gallery.
    pub async fn remove_image(&self, gallery: Vec<ImageEntry>, index: usize) -> GalleryResult<Vec<ImageEntry>> {
        let (next, removed) = remove_at(&gallery, index)?;

        let path = removed.path();
        if !path.is_empty() {
            match self.client.delete(path).await {
                Ok(DeleteOutcome::Deleted) => tracing::info!(path, "image deleted"),
                Ok(DeleteOutcome::NotFound) => tracing::debug!(path, "image already gone"),
                Err(err) => tracing::warn!(path, error = %err, "image delete failed, removing locally"),
            }
        }

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reorder::{is_dense, move_item};
    use mart_blob::{BlobConfig, MemoryBlobStore};
    use parking_lot::Mutex;

    fn adapter_with(store: MemoryBlobStore) -> (Arc<MemoryBlobStore>, UploadOrchestrator<dyn BlobClient>) {
        let store = Arc::new(store);
        let adapter: Arc<dyn BlobClient> = Arc::new(BlobAdapter::new(store.clone(), BlobConfig::default()));
        (store, UploadOrchestrator::new(adapter))
    }

    fn small_chunks() -> MemoryBlobStore {
        MemoryBlobStore::new(&BlobConfig::new().with_chunk_size(4))
    }

    fn file(name: &str, size: usize) -> FileHandle {
        FileHandle::new(name, Some("image/jpeg".into()), vec![7u8; size])
    }

    #[tokio::test]
    async fn all_uploads_succeed_in_selection_order() {
        let (store, orch) = adapter_with(small_chunks());
        let existing = vec![ImageEntry::remote("/media/old.jpg", "products/p1/old.jpg", 0)];

        let report = orch
            .submit_files(existing, vec![file("a.jpg", 10), file("b.jpg", 3), file("c.jpg", 8)], "p1", |_| {})
            .await;

        let g = &report.gallery;
        assert_eq!(g.len(), 4);
        assert!(is_dense(g));
        assert!(g.iter().all(|e| !e.is_uploading() && !e.path().is_empty()));
        assert!(g[1].path().ends_with("_a.jpg"));
        assert!(g[2].path().ends_with("_b.jpg"));
        assert!(g[3].path().ends_with("_c.jpg"));
        assert_eq!(report.uploaded, vec!["a.jpg", "b.jpg", "c.jpg"]);
        assert!(report.failed.is_empty());
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn same_named_files_stay_distinct_images() {
        let (store, orch) = adapter_with(small_chunks());

        let report = orch
            .submit_files(Vec::new(), vec![file("photo.jpg", 5), file("photo.jpg", 9)], "p1", |_| {})
            .await;

        let g = &report.gallery;
        assert_eq!(g.len(), 2);
        assert_ne!(g[0].path(), g[1].path());
        assert_eq!(store.len(), 2);

        let next = orch.remove_image(report.gallery.clone(), 0).await.unwrap();
        assert_eq!(next.len(), 1);
        assert!(store.contains(next[0].path()));
    }

    #[tokio::test]
    async fn failed_upload_is_dropped_and_gallery_renumbered() {
        let (store, orch) = adapter_with(small_chunks().reject_keys_containing("_second"));

        let report = orch
            .submit_files(
                Vec::new(),
                vec![file("first.jpg", 6), file("second.jpg", 6), file("third.jpg", 6)],
                "temp-1",
                |_| {},
            )
            .await;

        let g = &report.gallery;
        assert_eq!(g.len(), 2);
        assert_eq!(g.iter().map(|e| e.order()).collect::<Vec<_>>(), vec![0, 1]);
        assert!(g.iter().all(|e| !e.is_uploading() && !e.path().is_empty()));
        assert!(g[0].path().ends_with("_first.jpg"));
        assert!(g[1].path().ends_with("_third.jpg"));
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].file_name, "second.jpg");
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn caller_sees_placeholders_progress_and_terminal_states() {
        let (_store, orch) = adapter_with(small_chunks());
        let snapshots: Arc<Mutex<Vec<Vec<ImageEntry>>>> = Arc::default();
        let sink = Arc::clone(&snapshots);

        let report = orch
            .submit_files(Vec::new(), vec![file("a.jpg", 16), file("b.jpg", 4)], "p9", move |g| {
                sink.lock().push(g.to_vec());
            })
            .await;

        let snaps = snapshots.lock();
        assert_eq!(snaps.len(), report.updates);

        let first = &snaps[0];
        assert_eq!(first.len(), 2);
        assert!(first.iter().all(|e| e.is_uploading() && e.path().is_empty() && e.progress() == 0));
        assert_eq!(first.iter().map(|e| e.order()).collect::<Vec<_>>(), vec![0, 1]);

        // b never starts before a is finished
        for snap in snaps.iter() {
            if snap[1].progress() > 0 {
                assert!(!snap[0].is_uploading());
            }
        }

        let progress_of_a: Vec<u8> = snaps
            .iter()
            .filter(|s| s[0].is_uploading())
            .map(|s| s[0].progress())
            .collect();
        assert!(progress_of_a.windows(2).all(|w| w[0] < w[1]));
        assert!(progress_of_a.contains(&25));

        let last = snaps.last().unwrap();
        assert!(last.iter().all(|e| !e.is_uploading()));
    }

    #[tokio::test]
    async fn empty_batch_is_a_no_op() {
        let (_store, orch) = adapter_with(small_chunks());
        let mut calls = 0;
        let report = orch
            .submit_files(vec![ImageEntry::remote("u", "p", 3)], Vec::new(), "p1", |_| calls += 1)
            .await;

        assert_eq!(calls, 0);
        assert_eq!(report.updates, 0);
        assert_eq!(report.gallery[0].order(), 0);
    }

    #[tokio::test]
    async fn reorder_after_upload_then_remove_deletes_blob() {
        let (store, orch) = adapter_with(small_chunks());
        let report = orch
            .submit_files(Vec::new(), vec![file("a.jpg", 4), file("b.jpg", 4), file("c.jpg", 4)], "p1", |_| {})
            .await;

        let moved = move_item(&report.gallery, 0, 2).unwrap();
        assert!(moved[2].path().ends_with("_a.jpg"));
        assert!(moved[0].is_main());

        let removed_path = moved[0].path().to_string();
        let next = orch.remove_image(moved, 0).await.unwrap();
        assert_eq!(next.len(), 2);
        assert!(is_dense(&next));
        assert!(!store.contains(&removed_path));
    }

    struct FailingDelete;

    #[async_trait]
    impl BlobClient for FailingDelete {
        async fn upload(&self, _: &str, _: &FileHandle, _: ProgressSink) -> Result<StoredBlob, BlobError> {
            Err(BlobError::upload_failed("offline"))
        }

        async fn delete(&self, _: &str) -> Result<DeleteOutcome, BlobError> {
            Err(BlobError::upload_failed("offline"))
        }
    }

    #[tokio::test]
    async fn delete_failure_still_removes_locally() {
        let orch = UploadOrchestrator::new(Arc::new(FailingDelete));
        let gallery = vec![
            ImageEntry::remote("u0", "products/p/0.jpg", 0),
            ImageEntry::remote("u1", "products/p/1.jpg", 1),
        ];

        let next = orch.remove_image(gallery, 0).await.unwrap();
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].url(), "u1");
        assert!(next[0].is_main());

        assert!(orch.remove_image(next, 3).await.is_err());
    }
}
