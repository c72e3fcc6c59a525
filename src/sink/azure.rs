//! Azure Blob Storage sink
//!
//! Documents are uploaded as block blobs with `Put Blob`, authorized by a
//! SAS token on the request URL.

use crate::sink::traits::upload_failed;
use crate::sink::BlobSink;
use crate::FolioError;
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

const BLOB_API_VERSION: &str = "2021-08-06";

/// Uploads block blobs into an Azure Storage container
///
/// Requests are authorized by a pre-issued SAS token appended to each blob
/// URL. A `Put Blob` on an existing name replaces it.
#[derive(Debug, Clone)]
pub struct AzureBlobSink {
    client: Client,
    container: Url,
    sas_token: Option<String>,
}

impl AzureBlobSink {
    pub fn new(
        client: Client,
        container_url: &str,
        sas_token: Option<&str>,
    ) -> Result<Self, FolioError> {
        let mut container = Url::parse(container_url)?;
        container.set_query(None);
        container.set_fragment(None);

        let sas_token = sas_token
            .map(|token| token.trim().trim_start_matches('?').to_string())
            .filter(|token| !token.is_empty());

        Ok(Self {
            client,
            container,
            sas_token,
        })
    }

    /// Full request URL for blob `name`
    pub fn blob_url(&self, name: &str) -> Result<Url, FolioError> {
        let mut url = self.container.clone();
        url.path_segments_mut()
            .map_err(|_| upload_failed(name, "container URL cannot hold a path"))?
            .pop_if_empty()
            .push(name);
        url.set_query(self.sas_token.as_deref());
        Ok(url)
    }
}

#[async_trait]
impl BlobSink for AzureBlobSink {
    async fn store(&self, name: &str, bytes: &[u8]) -> Result<(), FolioError> {
        let url = self.blob_url(name)?;

        let response = self
            .client
            .put(url)
            .header("x-ms-blob-type", "BlockBlob")
            .header("x-ms-version", BLOB_API_VERSION)
            .header(reqwest::header::CONTENT_TYPE, "application/pdf")
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| upload_failed(name, e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(upload_failed(
                name,
                format!("HTTP {} {}", status.as_u16(), detail.trim()),
            ));
        }

        Ok(())
    }

    fn describe(&self) -> String {
        format!("azure-blob:{}", self.container)
    }
}
