//! Where finished PDFs go.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedFile {
    pub filename: String,
    pub bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[async_trait]
pub trait FileSink: Send + Sync {
    async fn save(&self, filename: &str, bytes: &[u8]) -> anyhow::Result<SavedFile>;
}

/// Keeps every saved file in memory. The HTTP layer reads the bytes back
/// out to stream them as the response body.
#[derive(Debug, Default)]
pub struct MemorySink {
    files: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn take(&self) -> Vec<(String, Vec<u8>)> {
        std::mem::take(&mut *self.files.lock().await)
    }

    pub async fn count(&self) -> usize {
        self.files.lock().await.len()
    }
}

#[async_trait]
impl FileSink for MemorySink {
    async fn save(&self, filename: &str, bytes: &[u8]) -> anyhow::Result<SavedFile> {
        self.files
            .lock()
            .await
            .push((filename.to_string(), bytes.to_vec()));
        Ok(SavedFile {
            filename: filename.to_string(),
            bytes: bytes.len(),
            path: None,
        })
    }
}

/// Writes into a directory. Files are written to a temporary sibling and
/// renamed into place, so readers never see a partial PDF.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirectorySink { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl FileSink for DirectorySink {
    async fn save(&self, filename: &str, bytes: &[u8]) -> anyhow::Result<SavedFile> {
        if Path::new(filename).file_name().and_then(|n| n.to_str()) != Some(filename) {
            bail!("refusing to save outside the export directory: {filename:?}");
        }

        let dir = self.dir.clone();
        let name = filename.to_string();
        let data = bytes.to_vec();
        let path = tokio::task::spawn_blocking(move || -> anyhow::Result<PathBuf> {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("creating {}", dir.display()))?;
            let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
            tmp.write_all(&data)?;
            tmp.flush()?;
            let path = dir.join(&name);
            tmp.persist(&path).map_err(|e| e.error)?;
            Ok(path)
        })
        .await
        .context("save task failed")??;

        info!(path = %path.display(), bytes = bytes.len(), "PDF saved");
        Ok(SavedFile {
            filename: filename.to_string(),
            bytes: bytes.len(),
            path: Some(path),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_sink_records_files() {
        let sink = MemorySink::new();
        let saved = sink.save("resume.pdf", b"%PDF-1.3").await.unwrap();
        assert_eq!(saved.bytes, 8);
        assert_eq!(sink.count().await, 1);
        let files = sink.take().await;
        assert_eq!(files[0].0, "resume.pdf");
        assert_eq!(sink.count().await, 0);
    }

    #[tokio::test]
    async fn test_directory_sink_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path().join("out"));
        let saved = sink.save("jordan-rivera-resume.pdf", b"%PDF").await.unwrap();
        let path = saved.path.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF");
        assert_eq!(std::fs::read_dir(dir.path().join("out")).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_directory_sink_rejects_paths() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        assert!(sink.save("../escape.pdf", b"x").await.is_err());
        assert!(sink.save("a/b.pdf", b"x").await.is_err());
    }
}
