//! The traversal loop: selection, navigation, scoring, recording.
//!
//! The engine owns the run: it seeds the primary pool, walks detail views
//! following the pool fallback chain, records qualifying discoveries, and
//! decides when the run is over (target reached, pools exhausted twice
//! without progress, or cancellation). Everything site-specific is behind
//! the `PageDriver`; everything durable is behind `HistoryStore` and
//! `ResultSink`.

use anyhow::{Context, Result};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::{HarvestConfig, SortStrategy};
use crate::driver::PageDriver;
use crate::history::HistoryStore;
use crate::report::ResultSink;

use super::identity::identity_for;
use super::pools::CandidatePools;
use super::recovery::SessionHealth;
use super::types::{Candidate, DiscoveryRecord, HarvestSummary, ItemStub};

pub struct TraversalEngine<D, H, S> {
    driver: D,
    history: H,
    sink: S,
    config: HarvestConfig,
    pools: CandidatePools,
    health: SessionHealth,
    rng: StdRng,
    cancel: Arc<AtomicBool>,
    recorded: usize,
    reseeds: usize,
    restarts: usize,
    /// Set on every re-seed, cleared by a qualifying recording. A second
    /// exhaustion while this is still set means the walk is producing
    /// nothing and the run ends. Visits alone are not progress.
    reseeded_without_progress: bool,
}

impl<D, H, S> TraversalEngine<D, H, S>
where
    D: PageDriver,
    H: HistoryStore,
    S: ResultSink,
{
    pub fn new(
        driver: D,
        history: H,
        sink: S,
        config: HarvestConfig,
        cancel: Arc<AtomicBool>,
    ) -> Self {
        let rng = match config.rng_seed() {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            driver,
            history,
            sink,
            config,
            pools: CandidatePools::new(),
            health: SessionHealth::default(),
            rng,
            cancel,
            recorded: 0,
            reseeds: 0,
            restarts: 0,
            reseeded_without_progress: false,
        }
    }

    /// Run the traversal to completion and return the summary.
    ///
    /// A failed initial seed is fatal; after that, navigation failures go
    /// through the recovery state machine and only a failed session restart
    /// aborts the run.
    pub async fn run(mut self) -> Result<HarvestSummary> {
        let started = Instant::now();
        info!(
            "starting harvest: query '{}', min score {}, target {}",
            self.config.query(),
            self.config.min_score(),
            self.config.target_count()
        );

        self.seed().await.context("initial seed view failed")?;

        let mut cancelled = false;
        while self.recorded < self.config.target_count() {
            if self.cancel.load(Ordering::Relaxed) {
                info!("cancellation requested, stopping after current step");
                cancelled = true;
                break;
            }

            let Some(candidate) = self.next_candidate().await? else {
                break;
            };

            // Siblings the walk is about to abandon survive in the
            // deferred pool.
            self.pools.defer_siblings(candidate.source);

            match self.driver.navigate_to(&candidate.stub.url).await {
                Ok(()) => match self.evaluate_view().await {
                    Ok((score, related)) => {
                        self.health.record_success();
                        self.record_if_qualifying(&candidate, score).await?;
                        self.pools.install_related(related);
                    }
                    Err(e) => {
                        warn!(
                            "content evaluation failed for {}: {e:#}",
                            candidate.stub.url
                        );
                        // The view is unreadable; drop its stale related pool
                        // and count this like a failed navigation.
                        self.pools.install_related(Vec::new());
                        if self.health.record_failure() {
                            self.restart().await?;
                        }
                    }
                },
                Err(e) => {
                    warn!("navigation to {} failed: {e:#}", candidate.stub.url);
                    if self.health.record_failure() {
                        self.restart().await?;
                    }
                }
            }

            self.step_delay().await;
        }

        if self.cancel.load(Ordering::Relaxed) {
            cancelled = true;
        }

        if let Err(e) = self.driver.close_session().await {
            warn!("failed to close browser session: {e:#}");
        }

        let summary = HarvestSummary {
            visited: self.pools.visited_count(),
            recorded: self.recorded,
            session_restarts: self.restarts,
            reseeds: self.reseeds,
            cancelled,
            elapsed_secs: started.elapsed().as_secs_f64(),
        };
        info!(
            "harvest finished: {} recorded, {} visited, {} restarts, {} reseeds in {:.1}s",
            summary.recorded, summary.visited, summary.session_restarts, summary.reseeds,
            summary.elapsed_secs
        );
        Ok(summary)
    }

    /// Open the seed search view and fill the primary pool from it
    async fn seed(&mut self) -> Result<()> {
        let sort = self.effective_sort();
        self.driver.open_seed_view(self.config.query(), sort).await?;
        for _ in 0..self.config.initial_scrolls() {
            if let Err(e) = self.driver.load_more().await {
                warn!("initial lazy load failed: {e:#}");
                break;
            }
        }
        let items = self.driver.list_visible_items().await?;
        let added = self.pools.merge_primary(items);
        info!("seed view opened: {added} candidates in primary pool");
        Ok(())
    }

    /// Sort for the next seed view, honoring the randomize-sort toggle
    fn effective_sort(&mut self) -> SortStrategy {
        if self.config.randomize_sort()
            && self.rng.random_range(0.0..1.0) < self.config.randomize_sort_probability()
        {
            let pick = SortStrategy::ALL[self.rng.random_range(0..SortStrategy::ALL.len())];
            debug!("sort randomized to {pick:?}");
            return pick;
        }
        self.config.sort()
    }

    /// Next candidate to visit, refilling and re-seeding as needed.
    ///
    /// `None` means the run is over: either the site yielded nothing new
    /// across two consecutive seed views, or cancellation was requested
    /// while the pools were empty.
    async fn next_candidate(&mut self) -> Result<Option<Candidate>> {
        loop {
            if let Some(candidate) = self.pools.select_next(&mut self.rng) {
                return Ok(Some(candidate));
            }

            if self.try_refill().await? > 0 {
                continue;
            }

            if self.cancel.load(Ordering::Relaxed) {
                return Ok(None);
            }
            if self.reseeded_without_progress {
                info!("pools exhausted again without progress, ending run");
                return Ok(None);
            }
            self.reseed().await?;
        }
    }

    /// Scroll the current view for more content; returns how many new
    /// candidates entered the primary pool. Failures here are soft, the
    /// caller falls through to a re-seed.
    async fn try_refill(&mut self) -> Result<usize> {
        match self.driver.load_more().await {
            Ok(n) => debug!("lazy load surfaced {n} more items"),
            Err(e) => {
                warn!("lazy load failed during refill: {e:#}");
                return Ok(0);
            }
        }
        let items = match self.driver.list_visible_items().await {
            Ok(items) => items,
            Err(e) => {
                warn!("listing items failed during refill: {e:#}");
                return Ok(0);
            }
        };
        Ok(self.pools.merge_primary(items))
    }

    /// Reopen the seed view after pool exhaustion, keeping the visited set
    async fn reseed(&mut self) -> Result<()> {
        self.reseeds += 1;
        self.reseeded_without_progress = true;
        info!("pools exhausted, reopening seed view (reseed #{})", self.reseeds);
        self.pools.clear_pools();
        self.seed().await.context("re-seed after exhaustion failed")?;
        Ok(())
    }

    /// Tear the browser session down and start over from the seed view.
    /// A failure here is fatal for the run.
    async fn restart(&mut self) -> Result<()> {
        self.restarts += 1;
        info!("restarting session (restart #{})", self.restarts);
        self.driver
            .restart_session()
            .await
            .context("session restart failed")?;
        self.pools.clear_pools();
        self.seed()
            .await
            .context("seed view after session restart failed")?;
        self.health.mark_restarted();
        Ok(())
    }

    /// Score and recommendations of the open detail view.
    ///
    /// Evaluation runs against the same browser session as navigation, so
    /// a failure here counts against session health exactly like a failed
    /// navigation.
    async fn evaluate_view(&mut self) -> Result<(u64, Vec<ItemStub>)> {
        let score = self.driver.current_item_score().await?;
        let related = self.driver.current_item_related_items().await?;
        Ok((score, related))
    }

    /// Apply the recording policy to a scored visit
    async fn record_if_qualifying(&mut self, candidate: &Candidate, score: u64) -> Result<()> {
        if score >= self.config.min_score() {
            let id = identity_for(&candidate.stub);
            if self.history.contains(&id) {
                debug!("skipping {id}: recorded in a previous run");
            } else {
                let record = DiscoveryRecord {
                    index: self.recorded + 1,
                    image_url: candidate.stub.best_image_url().to_string(),
                    score,
                    source_url: candidate.stub.url.clone(),
                    recorded_at: Utc::now(),
                };
                self.sink.append(&record).await?;
                self.history.add(&id).await?;
                self.recorded += 1;
                self.reseeded_without_progress = false;
                info!(
                    "recorded {}/{}: score {score} via {} pool ({})",
                    self.recorded,
                    self.config.target_count(),
                    candidate.source,
                    candidate.stub.url
                );
            }
        } else {
            debug!(
                "below threshold ({score} < {}): {}",
                self.config.min_score(),
                candidate.stub.url
            );
        }
        Ok(())
    }

    /// Randomized pause between steps, pacing the walk like a person
    async fn step_delay(&mut self) {
        let (lo, hi) = self.config.step_delay_bounds();
        let secs = if hi > lo { self.rng.random_range(lo..hi) } else { lo };
        if secs > 0.0 {
            tokio::time::sleep(Duration::from_secs_f64(secs)).await;
        }
    }
}
