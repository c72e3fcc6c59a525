//! In-memory sink

use crate::sink::BlobSink;
use crate::FolioError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// In-process sink; documents are dropped with the process
#[derive(Debug, Default)]
pub struct MemorySink {
    blobs: Mutex<BTreeMap<String, Vec<u8>>>,
    writes: Mutex<u64>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Contents stored under `name`
    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.blobs
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(name)
            .cloned()
    }

    /// Stored names in sorted order
    pub fn names(&self) -> Vec<String> {
        self.blobs
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .keys()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of successful `store` calls, counting overwrites
    pub fn write_count(&self) -> u64 {
        *self.writes.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[async_trait]
impl BlobSink for MemorySink {
    async fn store(&self, name: &str, bytes: &[u8]) -> Result<(), FolioError> {
        self.blobs
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(name.to_string(), bytes.to_vec());
        *self.writes.lock().unwrap_or_else(|p| p.into_inner()) += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
