//! JSON extraction strategy
//!
//! JSON documents carry no links or text bags; only the configured top-level
//! list field is copied into the structured payload.

use crate::extract::{ExtractContext, Extractable, Extraction, ExtractionRecord};
use crate::url::NormalizedUrl;
use serde_json::Value;

pub struct JsonExtractor<'a> {
    url: &'a NormalizedUrl,
    value: &'a Value,
}

impl<'a> JsonExtractor<'a> {
    pub fn new(url: &'a NormalizedUrl, value: &'a Value) -> Self {
        Self { url, value }
    }
}

impl Extractable for JsonExtractor<'_> {
    fn extract(&self, ctx: &ExtractContext<'_>) -> Extraction {
        let mut record = ExtractionRecord::empty(self.url.clone());

        match self.value.get(ctx.payload_field) {
            Some(Value::Array(items)) => {
                record.structured_payload = items.clone();
                tracing::debug!(
                    "Copied {} '{}' items from {}",
                    items.len(),
                    ctx.payload_field,
                    self.url
                );
            }
            Some(_) => tracing::debug!(
                "Field '{}' of {} is not a list, ignoring",
                ctx.payload_field,
                self.url
            ),
            None => {}
        }

        Extraction {
            record,
            links: Vec::new(),
        }
    }
}
