//! Blob sink trait
//!
//! A sink stores one named binary document. Storing under an existing name
//! overwrites it; there is no duplicate-name error.

use crate::FolioError;
use async_trait::async_trait;

#[async_trait]
pub trait BlobSink: Send + Sync {
    /// Stores `bytes` under `name`, replacing any previous blob
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The blob is durable
    /// * `Err(FolioError::UploadFailed)` - The blob could not be stored
    async fn store(&self, name: &str, bytes: &[u8]) -> Result<(), FolioError>;

    /// Short description used in logs
    fn describe(&self) -> String;
}

/// Builds the `UploadFailed` error for `name`
pub(crate) fn upload_failed(name: &str, cause: impl std::fmt::Display) -> FolioError {
    FolioError::UploadFailed {
        name: name.to_string(),
        cause: cause.to_string(),
    }
}
