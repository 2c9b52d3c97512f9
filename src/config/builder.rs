//! Type-safe builder for `HarvestConfig` using the typestate pattern
//!
//! The builder requires `storage_dir` and then `query` before `build()`
//! becomes available, so a config without its two required fields is a
//! compile error rather than a runtime one. `build()` still validates the
//! value ranges (positive target, probability in [0, 1], ordered delay
//! bounds).

use anyhow::Result;
use std::marker::PhantomData;
use std::path::PathBuf;

use super::types::{HarvestConfig, SortStrategy};

// Type states for the builder
pub struct WithStorageDir;
pub struct WithQuery;

pub struct HarvestConfigBuilder<State = ()> {
    config: HarvestConfig,
    _phantom: PhantomData<State>,
}

impl HarvestConfig {
    /// Create a builder for configuring a `HarvestConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> HarvestConfigBuilder<()> {
        HarvestConfigBuilder {
            config: HarvestConfig::default(),
            _phantom: PhantomData,
        }
    }
}

impl HarvestConfigBuilder<()> {
    pub fn storage_dir(mut self, dir: impl Into<PathBuf>) -> HarvestConfigBuilder<WithStorageDir> {
        self.config.storage_dir = dir.into();
        HarvestConfigBuilder {
            config: self.config,
            _phantom: PhantomData,
        }
    }
}

impl HarvestConfigBuilder<WithStorageDir> {
    pub fn query(mut self, query: impl Into<String>) -> HarvestConfigBuilder<WithQuery> {
        self.config.query = query.into();
        HarvestConfigBuilder {
            config: self.config,
            _phantom: PhantomData,
        }
    }
}

impl HarvestConfigBuilder<WithQuery> {
    pub fn build(self) -> Result<HarvestConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

// Optional fields are settable in any state
impl<State> HarvestConfigBuilder<State> {
    #[must_use]
    pub fn min_score(mut self, score: u64) -> Self {
        self.config.min_score = score;
        self
    }

    #[must_use]
    pub fn target_count(mut self, count: usize) -> Self {
        self.config.target_count = count;
        self
    }

    #[must_use]
    pub fn sort(mut self, sort: SortStrategy) -> Self {
        self.config.sort = sort;
        self
    }

    /// Enable the randomized-sort override with the given probability.
    ///
    /// Off by default: overriding the configured sort silently is dubious,
    /// so it is strictly opt-in.
    #[must_use]
    pub fn randomize_sort(mut self, probability: f64) -> Self {
        self.config.randomize_sort = true;
        self.config.randomize_sort_probability = probability;
        self
    }

    #[must_use]
    pub fn step_delay_secs(mut self, min: f64, max: f64) -> Self {
        self.config.step_delay_min_secs = min;
        self.config.step_delay_max_secs = max;
        self
    }

    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    #[must_use]
    pub fn initial_scrolls(mut self, scrolls: usize) -> Self {
        self.config.initial_scrolls = scrolls;
        self
    }

    /// Fix the selection RNG seed, making a run replayable
    #[must_use]
    pub fn rng_seed(mut self, seed: u64) -> Self {
        self.config.rng_seed = Some(seed);
        self
    }

    #[must_use]
    pub fn download_images(mut self, download: bool) -> Self {
        self.config.download_images = download;
        self
    }

    #[must_use]
    pub fn history_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.history_file = Some(path.into());
        self
    }

    #[must_use]
    pub fn report_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.report_file = Some(path.into());
        self
    }
}
