//! Seam between the crop engine and external blob storage.
//!
//! The engine never performs network I/O; a host hands the exported crop
//! to an [`UploadSink`] and gets back a durable URL for the stored blob.

use thiserror::Error;

/// Errors from an upload sink.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The sink refused or failed to store the blob.
    #[error("upload rejected: {0}")]
    Rejected(String),
}

/// Destination for exported crops.
pub trait UploadSink {
    /// Store the blob, returning a durable URL that dereferences to it.
    fn store(&mut self, blob: &[u8]) -> Result<String, UploadError>;
}

/// In-memory sink for tests and local previews.
#[derive(Debug, Default)]
pub struct MemorySink {
    blobs: Vec<Vec<u8>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blobs stored so far, in upload order.
    pub fn blobs(&self) -> &[Vec<u8>] {
        &self.blobs
    }
}

impl UploadSink for MemorySink {
    fn store(&mut self, blob: &[u8]) -> Result<String, UploadError> {
        if blob.is_empty() {
            return Err(UploadError::Rejected("empty blob".to_string()));
        }
        self.blobs.push(blob.to_vec());
        Ok(format!("memory://avatars/{}", self.blobs.len() - 1))
    }
}
