//! Gallery editing over HTTP: uploads into a draft, reorder, remove, and
//! serving stored images back under `/media`.

use std::convert::Infallible;

use axum::{
    body::Body,
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use mart_axum::MartAxumError;
use mart_blob::{guess_content_type, BlobError};
use mart_core::MartError;
use mart_gallery::{
    move_item, persisted_gallery, FailedUpload, FileHandle, GalleryError, GalleryImage, ImageEntry,
    UploadReport,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::state::StorefrontState;

type ApiResult<T> = Result<Json<T>, MartAxumError>;

/// Result of an upload batch once every file reached a terminal state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub gallery: Vec<GalleryImage>,
    pub uploaded: Vec<String>,
    pub failed: Vec<FailedUpload>,
    pub updates: usize,
}

impl From<UploadReport> for UploadResponse {
    fn from(report: UploadReport) -> Self {
        Self {
            gallery: persisted_gallery(&report.gallery),
            uploaded: report.uploaded,
            failed: report.failed,
            updates: report.updates,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub gallery: Vec<GalleryImage>,
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Deserialize)]
pub struct RemoveRequest {
    pub gallery: Vec<GalleryImage>,
    pub index: usize,
}

#[derive(Debug, Serialize)]
pub struct GalleryResponse {
    pub gallery: Vec<GalleryImage>,
}

fn gallery_error(err: GalleryError) -> MartAxumError {
    let data = match &err {
        GalleryError::IndexOutOfRange { index, len } => json!({"index": index, "len": len}),
        GalleryError::NoActiveDrag => json!({}),
    };
    MartError::bad_request(err.to_string()).with_data(data).into()
}

fn blob_error(err: BlobError) -> MartAxumError {
    match err {
        BlobError::NotFound { path } => MartError::not_found(format!("No image at {path}")).into(),
        BlobError::Invalid { message } => MartError::bad_request(message).into(),
        other => MartError::general_error("Image storage failed")
            .with_source(anyhow::Error::new(other))
            .into(),
    }
}

fn multipart_error(err: MultipartError) -> MartAxumError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        MartError::payload_too_large(err.body_text()).into()
    } else {
        MartError::bad_request(err.body_text()).into()
    }
}

/// Draft and product ids become one path segment of the storage key.
fn check_destination(id: &str) -> Result<(), MartAxumError> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(MartError::bad_request(format!("Invalid upload destination: {id:?}")).into())
    }
}

struct UploadBatch {
    gallery: Vec<ImageEntry>,
    files: Vec<FileHandle>,
}

/// Reads an optional `gallery` JSON field and every file part.
async fn read_batch(mut multipart: Multipart) -> Result<UploadBatch, MartAxumError> {
    let mut gallery = Vec::new();
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            if field.name() == Some("gallery") {
                let text = field.text().await.map_err(multipart_error)?;
                if !text.trim().is_empty() {
                    let current: Vec<GalleryImage> = serde_json::from_str(&text).map_err(|e| {
                        MartError::bad_request("gallery must be a JSON array of images")
                            .with_errors(json!({"gallery": [e.to_string()]}))
                    })?;
                    gallery = current.into_iter().map(ImageEntry::from).collect();
                }
            }
            continue;
        };

        let content_type = field
            .content_type()
            .map(str::to_string)
            .filter(|ct| ct != "application/octet-stream")
            .or_else(|| guess_content_type(&file_name).map(str::to_string));
        if !content_type.as_deref().is_some_and(|ct| ct.starts_with("image/")) {
            return Err(MartError::bad_request(format!("{file_name} is not an image"))
                .with_errors(json!({"files": [format!("{file_name} is not an image")]}))
                .into());
        }

        let bytes = field.bytes().await.map_err(multipart_error)?;
        files.push(FileHandle::new(file_name, content_type, bytes));
    }

    if files.is_empty() {
        return Err(MartError::bad_request("Please select at least one image").into());
    }

    Ok(UploadBatch { gallery, files })
}

async fn create_draft() -> Json<serde_json::Value> {
    Json(json!({"draftId": format!("temp-{}", Utc::now().timestamp_millis())}))
}

async fn upload_images(
    State(state): State<StorefrontState>,
    Path(draft_id): Path<String>,
    multipart: Multipart,
) -> ApiResult<UploadResponse> {
    check_destination(&draft_id)?;
    let batch = read_batch(multipart).await?;

    let report = state
        .uploads
        .submit_files(batch.gallery, batch.files, &draft_id, |_| {})
        .await;

    Ok(Json(UploadResponse::from(report)))
}

/// Same as `upload_images`, but every intermediate gallery is pushed as a
/// `gallery` event and the final result as `done`.
async fn upload_images_stream(
    State(state): State<StorefrontState>,
    Path(draft_id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, MartAxumError> {
    check_destination(&draft_id)?;
    let batch = read_batch(multipart).await?;

    let (tx, rx) = mpsc::unbounded_channel::<Result<Event, Infallible>>();
    let uploads = state.uploads.clone();

    tokio::spawn(async move {
        let updates = tx.clone();
        let report = uploads
            .submit_files(batch.gallery, batch.files, &draft_id, move |gallery| {
                match Event::default().event("gallery").json_data(gallery) {
                    Ok(event) => {
                        let _ = updates.send(Ok(event));
                    }
                    Err(err) => tracing::warn!(error = %err, "could not encode gallery update"),
                }
            })
            .await;

        match Event::default().event("done").json_data(UploadResponse::from(report)) {
            Ok(event) => {
                let _ = tx.send(Ok(event));
            }
            Err(err) => tracing::warn!(error = %err, "could not encode upload result"),
        }
    });

    Ok(Sse::new(UnboundedReceiverStream::new(rx)).keep_alive(KeepAlive::default()))
}

async fn reorder(Json(req): Json<ReorderRequest>) -> ApiResult<GalleryResponse> {
    let gallery = move_item(&req.gallery, req.from, req.to).map_err(gallery_error)?;
    Ok(Json(GalleryResponse { gallery }))
}

async fn remove(State(state): State<StorefrontState>, Json(req): Json<RemoveRequest>) -> ApiResult<GalleryResponse> {
    let entries: Vec<ImageEntry> = req.gallery.into_iter().map(ImageEntry::from).collect();
    let next = state
        .uploads
        .remove_image(entries, req.index)
        .await
        .map_err(gallery_error)?;

    Ok(Json(GalleryResponse {
        gallery: persisted_gallery(&next),
    }))
}

async fn media(State(state): State<StorefrontState>, Path(path): Path<String>) -> Result<Response, MartAxumError> {
    let blob = state.blobs.open(&path).await.map_err(blob_error)?;
    let content_type = blob
        .content_type
        .or_else(|| guess_content_type(&blob.path).map(str::to_string))
        .unwrap_or_else(|| "application/octet-stream".to_string());

    Ok(([(header::CONTENT_TYPE, content_type)], Body::from(blob.body)).into_response())
}

pub fn router(state: StorefrontState) -> Router<()> {
    let limit = state.config.max_request_bytes;
    Router::new()
        .route("/drafts", post(create_draft))
        .route("/reorder", post(reorder))
        .route("/remove", post(remove))
        .route("/{draft_id}/images", post(upload_images))
        .route("/{draft_id}/images/stream", post(upload_images_stream))
        .layer(DefaultBodyLimit::max(limit))
        .with_state(state)
}

pub fn media_router(state: StorefrontState) -> Router<()> {
    Router::new()
        .route("/media/{*path}", get(media))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destinations_are_single_safe_segments() {
        assert!(check_destination("temp-1700000000000").is_ok());
        assert!(check_destination("a1b2_c3").is_ok());
        assert!(check_destination("").is_err());
        assert!(check_destination("../etc").is_err());
        assert!(check_destination("a/b").is_err());
    }

    #[test]
    fn index_errors_become_bad_requests() {
        let err = gallery_error(GalleryError::IndexOutOfRange { index: 5, len: 2 });
        let mart = MartError::find_in(&err.0).unwrap();
        assert_eq!(mart.code(), 400);
        assert_eq!(mart.data.as_ref().unwrap()["len"], 2);
    }
}
