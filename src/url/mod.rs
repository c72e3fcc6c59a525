//! URL handling module for Folio-Crawl
//!
//! This module provides URL normalization, stored-name derivation and the
//! same-site scope filter.

mod normalize;
mod scope;

// Re-export main functions
pub use normalize::{normalize, normalize_with, storage_name, NormalizedUrl};
pub use scope::Scope;
