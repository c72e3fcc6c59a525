//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured user agent and timeouts
//! - Single-shot GET requests (no retry)
//! - Classifying the body as markup or a JSON document

use crate::config::UserAgentConfig;
use crate::url::NormalizedUrl;
use crate::FolioError;
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use std::time::Duration;

/// A fetched page, tagged by how its body should be extracted
#[derive(Debug, Clone)]
pub enum FetchedPage {
    /// Markup to be parsed for links and text
    Html { url: NormalizedUrl, body: String },

    /// A JSON document
    Json {
        url: NormalizedUrl,
        value: serde_json::Value,
    },
}

impl FetchedPage {
    /// The URL the page was requested under
    pub fn url(&self) -> &NormalizedUrl {
        match self {
            Self::Html { url, .. } | Self::Json { url, .. } => url,
        }
    }

    /// Tags a response body using its Content-Type, probing when unclear
    pub fn classify(url: NormalizedUrl, content_type: &str, body: String) -> Self {
        let content_type = content_type.to_ascii_lowercase();
        let declared_json =
            content_type.contains("application/json") || content_type.contains("+json");
        let declared_html = content_type.contains("html");

        if declared_json || (!declared_html && looks_like_json(&body)) {
            match serde_json::from_str(&body) {
                Ok(value) => return Self::Json { url, value },
                Err(e) => {
                    tracing::debug!("Body of {} is not valid JSON ({}), treating as markup", url, e)
                }
            }
        }

        Self::Html { url, body }
    }
}

fn looks_like_json(body: &str) -> bool {
    matches!(body.trim_start().chars().next(), Some('{') | Some('['))
}

/// Retrieves the raw content of one URL
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Issues a single request for `url`
    ///
    /// Network errors, timeouts and non-2xx statuses all come back as
    /// `FolioError::FetchFailed`.
    async fn fetch(&self, url: &NormalizedUrl) -> Result<FetchedPage, FolioError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Whole-request timeout
///
/// # Example
///
/// ```no_run
/// use folio_crawl::config::UserAgentConfig;
/// use folio_crawl::crawler::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "FolioCrawl".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: None,
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// `PageFetcher` backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &UserAgentConfig, timeout: Duration) -> Result<Self, FolioError> {
        Ok(Self::new(build_http_client(config, timeout)?))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &NormalizedUrl) -> Result<FetchedPage, FolioError> {
        let failed = |cause: String| FolioError::FetchFailed {
            url: url.to_string(),
            cause,
        };

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    failed("request timed out".to_string())
                } else if e.is_connect() {
                    failed(format!("connection failed: {}", e))
                } else {
                    failed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(failed(format!("HTTP {}", status.as_u16())));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = response.text().await.map_err(|e| failed(e.to_string()))?;

        tracing::debug!(
            "Fetched {} ({} bytes, content-type {:?})",
            url,
            body.len(),
            content_type
        );

        Ok(FetchedPage::classify(url.clone(), &content_type, body))
    }
}
