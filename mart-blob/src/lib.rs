//! # mart-blob: product image storage
//!
//! ```text
//! ┌─────────────────┐
//! │   Gallery code  │  ← ordering, placeholders
//! ├─────────────────┤
//! │   BlobAdapter   │  ← key naming, limits, logging
//! ├─────────────────┤
//! │   BlobStore     │  ← memory / filesystem primitives
//! └─────────────────┘
//! ```
//!
//! Keys follow `products/{productId}/{timestampMillis}_{fileName}`. Stores
//! transfer in chunks and report progress through a [`ProgressSink`].

pub mod adapter;
mod config;
mod error;
pub mod fs;
pub mod memory;
pub mod store;
mod types;

pub use adapter::BlobAdapter;
pub use config::BlobConfig;
pub use error::{BlobError, BlobResult};
pub use fs::{guess_content_type, FsBlobStore};
pub use memory::MemoryBlobStore;
pub use store::{BlobKeyStrategy, BlobStore, ProductImageKeys, PutResult};
pub use types::{
    BlobUpload, DeleteOutcome, OpenedBlob, ProgressSink, StoredBlob, TransferProgress,
};

