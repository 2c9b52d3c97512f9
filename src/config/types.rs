//! Configuration types for harvest runs.
//!
//! This module contains the main `HarvestConfig` struct: the recognized
//! options that affect the traversal engine, plus storage and browser
//! settings for the adapters around it. Configuration errors are fatal at
//! startup; no traversal is attempted with an invalid config.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Sort strategy applied to the seed search view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortStrategy {
    Relevance,
    Latest,
    Popular,
}

impl SortStrategy {
    /// Query-parameter value for non-default strategies
    #[must_use]
    pub fn as_query_value(self) -> Option<&'static str> {
        match self {
            Self::Relevance => None,
            Self::Latest => Some("latest"),
            Self::Popular => Some("popular"),
        }
    }

    pub const ALL: [Self; 3] = [Self::Relevance, Self::Latest, Self::Popular];
}

/// Main configuration struct for a harvest run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Base directory for the task folder, history file, and downloads
    pub(crate) storage_dir: PathBuf,
    /// Search query text (required, non-empty)
    pub(crate) query: String,
    /// Minimum popularity score for an item to be recorded
    pub(crate) min_score: u64,
    /// Qualifying-record count at which the run terminates
    pub(crate) target_count: usize,
    pub(crate) sort: SortStrategy,
    /// When true, each seed or re-seed may override the configured sort
    /// with a uniformly random strategy
    pub(crate) randomize_sort: bool,
    /// Probability of the randomized-sort override, in [0, 1]
    pub(crate) randomize_sort_probability: f64,
    /// Lower bound of the randomized inter-step delay, seconds
    pub(crate) step_delay_min_secs: f64,
    /// Upper bound of the randomized inter-step delay, seconds
    pub(crate) step_delay_max_secs: f64,
    pub(crate) headless: bool,
    /// Lazy-load scrolls issued right after opening a seed view
    pub(crate) initial_scrolls: usize,
    /// Fixed seed for the selection RNG; None draws from the OS
    pub(crate) rng_seed: Option<u64>,
    /// Download the image of each qualifying discovery
    pub(crate) download_images: bool,
    /// History file override; defaults to `<storage_dir>/.harvest_history.json`
    pub(crate) history_file: Option<PathBuf>,
    /// Report file override; defaults to `<task_dir>/discoveries.jsonl`
    pub(crate) report_file: Option<PathBuf>,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("./downloads"),
            query: String::new(),
            min_score: 500,
            target_count: 100,
            sort: SortStrategy::Relevance,
            randomize_sort: false,
            randomize_sort_probability: 0.3,
            step_delay_min_secs: 1.0,
            step_delay_max_secs: 3.0,
            headless: true,
            initial_scrolls: 3,
            rng_seed: None,
            download_images: true,
            history_file: None,
            report_file: None,
        }
    }
}

impl HarvestConfig {
    /// Load a config from a JSON file and validate it
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate option values; called by the builder and by file loading
    pub fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(anyhow!("query must not be empty"));
        }
        if self.target_count == 0 {
            return Err(anyhow!("target_count must be a positive integer"));
        }
        if !(0.0..=1.0).contains(&self.randomize_sort_probability) {
            return Err(anyhow!(
                "randomize_sort_probability must be in [0, 1], got {}",
                self.randomize_sort_probability
            ));
        }
        if self.step_delay_min_secs < 0.0 || self.step_delay_max_secs < self.step_delay_min_secs {
            return Err(anyhow!(
                "step delay bounds must satisfy 0 <= min <= max, got {}..{}",
                self.step_delay_min_secs,
                self.step_delay_max_secs
            ));
        }
        Ok(())
    }
}
