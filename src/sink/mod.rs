//! Blob sink module for persisting rendered documents
//!
//! This module handles durable storage of documents, including:
//! - The `BlobSink` trait used by the crawler
//! - An in-memory sink that keeps nothing past the run
//! - A local directory sink
//! - An Azure Blob Storage sink authorized by SAS token

mod azure;
mod fs;
mod memory;
mod traits;

pub use azure::AzureBlobSink;
pub use fs::FsSink;
pub use memory::MemorySink;
pub use traits::BlobSink;

use crate::config::SinkConfig;
use crate::FolioError;
use reqwest::Client;
use std::sync::Arc;

/// Builds the sink described by the configuration
///
/// # Arguments
///
/// * `config` - The `[sink]` section
/// * `client` - HTTP client shared with the fetcher
pub fn build_sink(config: &SinkConfig, client: Client) -> Result<Arc<dyn BlobSink>, FolioError> {
    let sink: Arc<dyn BlobSink> = match config {
        SinkConfig::Filesystem { directory } => Arc::new(FsSink::new(directory)),
        SinkConfig::AzureBlob {
            container_url,
            sas_token,
        } => Arc::new(AzureBlobSink::new(
            client,
            container_url,
            sas_token.as_deref(),
        )?),
        SinkConfig::Memory => Arc::new(MemorySink::new()),
    };
    Ok(sink)
}
