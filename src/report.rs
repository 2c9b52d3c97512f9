//! Result sink: the append-only record of qualifying discoveries.
//!
//! Every record is durable as soon as `append` returns; a run that dies
//! mid-traversal keeps everything it recorded. Write order matters for
//! audit, not correctness.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::downloader::ImageDownloader;
use crate::engine::types::DiscoveryRecord;

/// Append-only record of qualifying discoveries
#[allow(async_fn_in_trait)]
pub trait ResultSink {
    /// Append one record; durable before returning
    async fn append(&mut self, record: &DiscoveryRecord) -> Result<()>;
    fn record_count(&self) -> usize;
}

/// Sink writing one JSON object per line to a report file
#[derive(Debug)]
pub struct JsonlReportSink {
    path: PathBuf,
    written: usize,
}

impl JsonlReportSink {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            written: 0,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultSink for JsonlReportSink {
    async fn append(&mut self, record: &DiscoveryRecord) -> Result<()> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("failed to create report dir {}", dir.display()))?;
        }
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("failed to open report file {}", self.path.display()))?;
        file.write_all(line.as_bytes())
            .await
            .with_context(|| format!("failed to append to report file {}", self.path.display()))?;
        file.flush().await?;
        self.written += 1;
        Ok(())
    }

    fn record_count(&self) -> usize {
        self.written
    }
}

/// Sink that writes the report line and then captures the image itself.
///
/// Download failures are logged and swallowed: the record already made it
/// to the report, and a missing image file is recoverable from the url.
pub struct ArchivingSink {
    report: JsonlReportSink,
    downloader: Option<ImageDownloader>,
}

impl ArchivingSink {
    #[must_use]
    pub fn new(report: JsonlReportSink, downloader: Option<ImageDownloader>) -> Self {
        Self { report, downloader }
    }
}

impl ResultSink for ArchivingSink {
    async fn append(&mut self, record: &DiscoveryRecord) -> Result<()> {
        self.report.append(record).await?;
        if let Some(downloader) = &self.downloader {
            match downloader.fetch(record).await {
                Ok(path) => info!("image saved: {}", path.display()),
                Err(e) => warn!("image download failed for {}: {e:#}", record.image_url),
            }
        }
        Ok(())
    }

    fn record_count(&self) -> usize {
        self.report.record_count()
    }
}
