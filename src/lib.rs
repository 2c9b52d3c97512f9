//! Popular-image discovery through browser-driven traversal.
//!
//! Given a search query and a popularity threshold, this crate drives a
//! Chromium session over a pin-board discovery site: it opens the search
//! view, follows pins and their recommendations, and records every pin
//! whose popularity score clears the threshold. Qualifying images can be
//! downloaded alongside the report. Recorded pins persist in a history
//! file across runs and are never recorded twice.
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::sync::atomic::AtomicBool;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = pinscrape::HarvestConfig::builder()
//!     .storage_dir("./downloads")
//!     .query("mid century interiors")
//!     .min_score(1000)
//!     .target_count(50)
//!     .build()?;
//!
//! let cancel = Arc::new(AtomicBool::new(false));
//! let summary = pinscrape::harvest(config, cancel).await?;
//! println!("recorded {} discoveries", summary.recorded);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod downloader;
pub mod driver;
pub mod engine;
pub mod error;
pub mod history;
pub mod report;

pub use config::{HarvestConfig, HarvestConfigBuilder, SortStrategy};
pub use engine::{DiscoveryRecord, HarvestSummary, ItemStub, TraversalEngine};
pub use error::{HarvestError, HarvestResult};
pub use history::{HistoryStore, JsonHistoryStore};
pub use report::{JsonlReportSink, ResultSink};

use chrono::Local;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tracing::info;

use downloader::ImageDownloader;
use driver::pinboard::PinboardDriver;
use report::ArchivingSink;

/// Directory for this run's report and downloads: `<storage>/<query>_<stamp>`
fn task_dir(config: &HarvestConfig) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let name = sanitize_filename::sanitize(format!(
        "{}_{stamp}",
        config.query().replace(' ', "_")
    ));
    config.storage_dir().join(name)
}

/// Run a full harvest with the real browser driver and on-disk storage.
///
/// Wires a `PinboardDriver`, the JSON history store, and a JSONL report
/// sink (with image downloads unless disabled) into a `TraversalEngine`
/// and runs it to completion. Set `cancel` to stop gracefully; the run
/// finishes its current step and returns a summary with `cancelled` set.
pub async fn harvest(
    config: HarvestConfig,
    cancel: Arc<AtomicBool>,
) -> HarvestResult<HarvestSummary> {
    config
        .validate()
        .map_err(|e| HarvestError::Config(format!("{e:#}")))?;

    let task_dir = task_dir(&config);
    tokio::fs::create_dir_all(&task_dir)
        .await
        .map_err(|e| HarvestError::Storage(format!("failed to create {}: {e}", task_dir.display())))?;
    info!("task directory: {}", task_dir.display());

    let history = JsonHistoryStore::load(config.history_file())
        .await
        .map_err(|e| HarvestError::Storage(format!("{e:#}")))?;

    let report_path = config
        .report_file()
        .map(PathBuf::from)
        .unwrap_or_else(|| task_dir.join("discoveries.jsonl"));
    let downloader = if config.download_images() {
        Some(
            ImageDownloader::new(&task_dir, config.query())
                .map_err(|e| HarvestError::Storage(format!("{e:#}")))?,
        )
    } else {
        None
    };
    let sink = ArchivingSink::new(JsonlReportSink::new(report_path), downloader);

    let driver = PinboardDriver::connect(config.headless()).await?;

    let engine = TraversalEngine::new(driver, history, sink, config, cancel);
    Ok(engine.run().await?)
}
