//! Document rendering
//!
//! An extraction record is laid out into pages (`layout`) and then painted
//! into a PDF (`pdf`). Pagination happens during layout, so tests can check
//! document structure without parsing PDF bytes.

pub mod layout;
mod pdf;

pub use layout::{layout, sections, DocumentLayout, Section};

use crate::extract::ExtractionRecord;
use crate::url::storage_name;
use crate::FolioError;

/// A rendered document ready for the blob sink
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    /// Derived storage name, `<sanitized-source-url>.pdf`
    pub name: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Turns one extraction record into a stored document
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, record: &ExtractionRecord) -> Result<RenderedDocument, FolioError>;
}

/// Renders records as paginated PDFs
#[derive(Debug, Clone, Default)]
pub struct PdfRenderer;

impl PdfRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentRenderer for PdfRenderer {
    fn render(&self, record: &ExtractionRecord) -> Result<RenderedDocument, FolioError> {
        let layout = layout::layout(record);
        let bytes = pdf::paint(layout::DOCUMENT_TITLE, &layout).map_err(|cause| {
            FolioError::RenderFailed {
                url: record.source_url.to_string(),
                cause,
            }
        })?;

        Ok(RenderedDocument {
            name: storage_name(&record.source_url),
            bytes,
            page_count: layout.page_count(),
        })
    }
}
