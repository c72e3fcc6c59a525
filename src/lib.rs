//! Folio-Crawl: a site-to-document crawler
//!
//! This crate walks every page reachable under a base URL, extracts the textual
//! content of each page, renders it as a paginated PDF and hands the document to
//! a blob sink for durable storage.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod render;
pub mod sink;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Folio-Crawl operations
#[derive(Debug, Error)]
pub enum FolioError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch failed for {url}: {cause}")]
    FetchFailed { url: String, cause: String },

    #[error("Render failed for {url}: {cause}")]
    RenderFailed { url: String, cause: String },

    #[error("Upload failed for {name}: {cause}")]
    UploadFailed { name: String, cause: String },

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::PageState,
        to: state::PageState,
    },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Folio-Crawl operations
pub type Result<T> = std::result::Result<T, FolioError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, Coordinator};
pub use extract::ExtractionRecord;
pub use output::CrawlReport;
pub use render::RenderedDocument;
pub use sink::BlobSink;
pub use state::PageState;
pub use url::{normalize, storage_name, NormalizedUrl};
