//! Read accessors for `HarvestConfig`

use std::path::{Path, PathBuf};

use super::types::{HarvestConfig, SortStrategy};

impl HarvestConfig {
    #[must_use]
    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn min_score(&self) -> u64 {
        self.min_score
    }

    #[must_use]
    pub fn target_count(&self) -> usize {
        self.target_count
    }

    #[must_use]
    pub fn sort(&self) -> SortStrategy {
        self.sort
    }

    #[must_use]
    pub fn randomize_sort(&self) -> bool {
        self.randomize_sort
    }

    #[must_use]
    pub fn randomize_sort_probability(&self) -> f64 {
        self.randomize_sort_probability
    }

    /// (min, max) randomized inter-step delay bounds in seconds
    #[must_use]
    pub fn step_delay_bounds(&self) -> (f64, f64) {
        (self.step_delay_min_secs, self.step_delay_max_secs)
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    #[must_use]
    pub fn initial_scrolls(&self) -> usize {
        self.initial_scrolls
    }

    #[must_use]
    pub fn rng_seed(&self) -> Option<u64> {
        self.rng_seed
    }

    #[must_use]
    pub fn download_images(&self) -> bool {
        self.download_images
    }

    /// History file path, defaulting to a dotfile under the storage dir
    #[must_use]
    pub fn history_file(&self) -> PathBuf {
        self.history_file
            .clone()
            .unwrap_or_else(|| self.storage_dir.join(".harvest_history.json"))
    }

    #[must_use]
    pub fn report_file(&self) -> Option<&Path> {
        self.report_file.as_deref()
    }
}
