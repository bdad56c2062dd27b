//! mart-gallery: the ordered image gallery behind the product editor.
//!
//! - [`entry`]: the image model (local preview or remote image)
//! - [`reorder`]: drag moves, removal and dense renumbering
//! - [`orchestrator`]: optimistic placeholders and sequential uploads

pub mod entry;
mod error;
pub mod orchestrator;
pub mod reorder;

pub use entry::{persisted_gallery, GalleryImage, ImageEntry, ImageSource, Ordered};
pub use error::{GalleryError, GalleryResult};
pub use orchestrator::{BlobClient, FailedUpload, FileHandle, UploadOrchestrator, UploadReport};
pub use reorder::{is_dense, move_item, remove_at, renumber, DragSession};
