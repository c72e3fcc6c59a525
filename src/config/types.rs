use serde::Deserialize;

/// Main configuration structure for Folio-Crawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub sink: SinkConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Seed URL; also the scope prefix and the base for resolving links
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum number of pages in flight at once
    #[serde(rename = "max-concurrent-pages", default = "default_concurrency")]
    pub max_concurrent_pages: u32,

    /// Upper bound on pages claimed in one run
    #[serde(rename = "max-pages", default)]
    pub max_pages: Option<u32>,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_timeout")]
    pub request_timeout_secs: u64,

    /// Top-level JSON field copied into the structured payload
    #[serde(rename = "payload-field", default = "default_payload_field")]
    pub payload_field: String,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

/// Where rendered documents are stored
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SinkConfig {
    /// Write documents into a local directory
    Filesystem { directory: String },

    /// Upload to an Azure Blob Storage container through a SAS URL
    AzureBlob {
        #[serde(rename = "container-url")]
        container_url: String,
        #[serde(rename = "sas-token", default)]
        sas_token: Option<String>,
    },

    /// Keep documents in process memory; nothing outlives the run
    Memory,
}

fn default_concurrency() -> u32 {
    1
}

fn default_timeout() -> u64 {
    30
}

pub fn default_payload_field() -> String {
    "products".to_string()
}
