//! Local directory sink
//!
//! Each document is written to `<directory>/<name>` through a staging file
//! that is renamed into place.

use crate::sink::traits::upload_failed;
use crate::sink::BlobSink;
use crate::FolioError;
use async_trait::async_trait;
use std::path::PathBuf;

/// Writes each blob to `<directory>/<name>`
#[derive(Debug, Clone)]
pub struct FsSink {
    directory: PathBuf,
}

impl FsSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &PathBuf {
        &self.directory
    }
}

#[async_trait]
impl BlobSink for FsSink {
    async fn store(&self, name: &str, bytes: &[u8]) -> Result<(), FolioError> {
        // Derived names never contain path separators
        if name.is_empty() || name.contains(|c: char| c == '/' || c == '\\') || name == ".." {
            return Err(upload_failed(name, "invalid blob name"));
        }

        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| upload_failed(name, e))?;

        // Stage, then rename over the target
        let target = self.directory.join(name);
        let staging = self.directory.join(format!(".{}.part", name));
        tokio::fs::write(&staging, bytes)
            .await
            .map_err(|e| upload_failed(name, e))?;
        tokio::fs::rename(&staging, &target)
            .await
            .map_err(|e| upload_failed(name, e))?;

        Ok(())
    }

    fn describe(&self) -> String {
        format!("filesystem:{}", self.directory.display())
    }
}
