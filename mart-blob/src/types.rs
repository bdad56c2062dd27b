use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Bytes moved so far for one transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferProgress {
    pub bytes_transferred: u64,
    pub total_bytes: u64,
}

impl TransferProgress {
    pub fn new(bytes_transferred: u64, total_bytes: u64) -> Self {
        Self {
            bytes_transferred,
            total_bytes,
        }
    }

    /// Whole percentage in `0..=100`. An empty body counts as complete.
    pub fn percent(&self) -> u8 {
        if self.total_bytes == 0 {
            return 100;
        }
        let pct = self.bytes_transferred.saturating_mul(100) / self.total_bytes;
        pct.min(100) as u8
    }
}

/// Where a store reports transfer progress.
///
/// Reports go through an unbounded channel so the store never waits on
/// the listener; a dropped receiver silently discards them.
#[derive(Debug, Clone, Default)]
pub struct ProgressSink {
    tx: Option<mpsc::UnboundedSender<TransferProgress>>,
}

impl ProgressSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TransferProgress>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    pub fn noop() -> Self {
        Self::default()
    }

    pub fn report(&self, bytes_transferred: u64, total_bytes: u64) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(TransferProgress::new(bytes_transferred, total_bytes));
        }
    }
}

/// One file headed for the blob store.
#[derive(Debug, Clone)]
pub struct BlobUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl BlobUpload {
    pub fn new(file_name: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            body: body.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn size_bytes(&self) -> u64 {
        self.body.len() as u64
    }
}

/// A blob that made it to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredBlob {
    /// Public URL clients load the image from.
    pub url: String,
    /// Durable storage key, used for deletion.
    pub path: String,
    pub size_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Content and metadata read back from a store.
#[derive(Debug, Clone)]
pub struct OpenedBlob {
    pub path: String,
    pub body: Bytes,
    pub content_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_is_proportional_and_clamped() {
        assert_eq!(TransferProgress::new(0, 200).percent(), 0);
        assert_eq!(TransferProgress::new(99, 200).percent(), 49);
        assert_eq!(TransferProgress::new(200, 200).percent(), 100);
        assert_eq!(TransferProgress::new(300, 200).percent(), 100);
        assert_eq!(TransferProgress::new(0, 0).percent(), 100);
    }

    #[tokio::test]
    async fn sink_forwards_reports_and_tolerates_dropped_receiver() {
        let (sink, mut rx) = ProgressSink::channel();
        sink.report(10, 40);
        assert_eq!(rx.recv().await, Some(TransferProgress::new(10, 40)));

        drop(rx);
        sink.report(40, 40);
        ProgressSink::noop().report(1, 1);
    }
}
