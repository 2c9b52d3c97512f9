//! Scripted test doubles for the traversal engine: a mock page driver and
//! in-memory history/sink implementations, all observable from outside the
//! engine after it has consumed them.

use anyhow::{Result, anyhow};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use pinscrape::config::SortStrategy;
use pinscrape::driver::PageDriver;
use pinscrape::engine::{DiscoveryRecord, ItemStub};
use pinscrape::history::HistoryStore;
use pinscrape::report::ResultSink;

/// A pin stub with the site's url shapes; no explicit id, so identity is
/// derived from the url.
pub fn pin(id: u64) -> ItemStub {
    ItemStub {
        id: None,
        url: format!("https://www.pinterest.com/pin/{id}/"),
        image_url: format!("https://i.pinimg.com/236x/{id}.jpg"),
        image_url_hq: Some(format!("https://i.pinimg.com/originals/{id}.jpg")),
        title: format!("pin {id}"),
    }
}

/// Shared, clonable event log surviving the engine taking ownership of the
/// driver.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: String) {
        self.0.lock().unwrap().push(event);
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }
}

/// Scripted `PageDriver`.
///
/// Each `open_seed_view` pops the next seed batch (empty once the script
/// runs out), `load_more` pops the next extra batch, and navigation
/// succeeds unless the url was marked failing. Every call is logged.
#[derive(Default)]
pub struct MockDriver {
    seed_batches: VecDeque<Vec<ItemStub>>,
    extra_batches: VecDeque<Vec<ItemStub>>,
    scores: HashMap<String, u64>,
    related: HashMap<String, Vec<ItemStub>>,
    failing: HashSet<String>,
    failing_eval: HashSet<String>,
    restart_fails: bool,
    current_visible: Vec<ItemStub>,
    current_url: Option<String>,
    events: EventLog,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Contents of the next seed view, in script order
    pub fn seed_batch(mut self, items: Vec<ItemStub>) -> Self {
        self.seed_batches.push_back(items);
        self
    }

    /// Contents surfaced by the next `load_more`, in script order
    pub fn extra_batch(mut self, items: Vec<ItemStub>) -> Self {
        self.extra_batches.push_back(items);
        self
    }

    pub fn score(mut self, stub: &ItemStub, score: u64) -> Self {
        self.scores.insert(stub.url.clone(), score);
        self
    }

    pub fn related_items(mut self, stub: &ItemStub, items: Vec<ItemStub>) -> Self {
        self.related.insert(stub.url.clone(), items);
        self
    }

    pub fn failing_nav(mut self, stub: &ItemStub) -> Self {
        self.failing.insert(stub.url.clone());
        self
    }

    /// Navigation to this stub succeeds, but reading the resulting view
    /// (score, related items) fails.
    pub fn failing_eval(mut self, stub: &ItemStub) -> Self {
        self.failing_eval.insert(stub.url.clone());
        self
    }

    pub fn failing_restart(mut self) -> Self {
        self.restart_fails = true;
        self
    }

    pub fn events(&self) -> EventLog {
        self.events.clone()
    }
}

impl PageDriver for MockDriver {
    async fn open_seed_view(&mut self, _query: &str, sort: SortStrategy) -> Result<()> {
        self.events.push(format!("seed:{sort:?}"));
        self.current_visible = self.seed_batches.pop_front().unwrap_or_default();
        self.current_url = None;
        Ok(())
    }

    async fn load_more(&mut self) -> Result<usize> {
        let extra = self.extra_batches.pop_front().unwrap_or_default();
        let count = extra.len();
        self.current_visible.extend(extra);
        Ok(count)
    }

    async fn list_visible_items(&mut self) -> Result<Vec<ItemStub>> {
        Ok(self.current_visible.clone())
    }

    async fn navigate_to(&mut self, url: &str) -> Result<()> {
        if self.failing.contains(url) {
            self.events.push(format!("nav_fail:{url}"));
            return Err(anyhow!("scripted navigation failure for {url}"));
        }
        self.events.push(format!("nav:{url}"));
        self.current_url = Some(url.to_string());
        Ok(())
    }

    async fn current_item_score(&mut self) -> Result<u64> {
        let url = self.current_url.as_deref().unwrap_or_default();
        if self.failing_eval.contains(url) {
            self.events.push(format!("eval_fail:{url}"));
            return Err(anyhow!("scripted evaluation failure for {url}"));
        }
        Ok(self.scores.get(url).copied().unwrap_or(0))
    }

    async fn current_item_related_items(&mut self) -> Result<Vec<ItemStub>> {
        let url = self.current_url.as_deref().unwrap_or_default();
        if self.failing_eval.contains(url) {
            return Err(anyhow!("scripted evaluation failure for {url}"));
        }
        Ok(self.related.get(url).cloned().unwrap_or_default())
    }

    async fn restart_session(&mut self) -> Result<()> {
        if self.restart_fails {
            self.events.push("restart_fail".to_string());
            return Err(anyhow!("scripted restart failure"));
        }
        self.events.push("restart".to_string());
        self.current_visible.clear();
        self.current_url = None;
        Ok(())
    }

    async fn close_session(&mut self) -> Result<()> {
        self.events.push("close".to_string());
        Ok(())
    }
}

/// In-memory history with an externally observable add log
#[derive(Clone, Default)]
pub struct MemoryHistory {
    seen: Arc<Mutex<HashSet<String>>>,
    added: Arc<Mutex<Vec<String>>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preloaded(ids: &[&str]) -> Self {
        let history = Self::default();
        history
            .seen
            .lock()
            .unwrap()
            .extend(ids.iter().map(|s| s.to_string()));
        history
    }

    /// Identities added during the run, in order
    pub fn added(&self) -> Vec<String> {
        self.added.lock().unwrap().clone()
    }
}

impl HistoryStore for MemoryHistory {
    fn contains(&self, id: &str) -> bool {
        self.seen.lock().unwrap().contains(id)
    }

    async fn add(&mut self, id: &str) -> Result<()> {
        if self.seen.lock().unwrap().insert(id.to_string()) {
            self.added.lock().unwrap().push(id.to_string());
        }
        Ok(())
    }

    fn count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

/// In-memory sink keeping every appended record observable
#[derive(Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<DiscoveryRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<DiscoveryRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl ResultSink for MemorySink {
    async fn append(&mut self, record: &DiscoveryRecord) -> Result<()> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}
