/// Configuration for blob operations
#[derive(Debug, Clone)]
pub struct BlobConfig {
    /// Largest single image accepted
    pub max_blob_bytes: u64,

    /// Transfer granularity; one progress report per chunk
    pub chunk_size: usize,

    /// Prefix for public URLs (`/media` or a CDN origin)
    pub public_base_url: String,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            max_blob_bytes: 10 * 1024 * 1024, // 10MB
            chunk_size: 64 * 1024,            // 64KB
            public_base_url: "/media".to_string(),
        }
    }
}

impl BlobConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_blob_bytes(mut self, bytes: u64) -> Self {
        self.max_blob_bytes = bytes;
        self
    }

    /// Zero is bumped to one byte.
    pub fn with_chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size = bytes.max(1);
        self
    }

    pub fn with_public_base_url<S: Into<String>>(mut self, url: S) -> Self {
        self.public_base_url = url.into();
        self
    }
}
