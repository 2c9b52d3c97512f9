//! Core data types for the traversal engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A discovered item before scoring: the minimum the engine needs to
/// navigate to it and, if it qualifies, to record it.
///
/// Identity for deduplication is `url`. The `id` is a secondary key used
/// for cross-run history; when the page did not expose one it is derived
/// from the url (or synthesized) at recording time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStub {
    /// Site-assigned item id, when derivable from the markup
    #[serde(default)]
    pub id: Option<String>,
    /// Detail-page address; required, used as dedup identity
    pub url: String,
    /// Image address as rendered in the grid
    pub image_url: String,
    /// Higher-resolution variant of `image_url`, when the grid url maps to one
    #[serde(default)]
    pub image_url_hq: Option<String>,
    #[serde(default)]
    pub title: String,
}

impl ItemStub {
    /// Best available image address, preferring the high-quality variant
    #[must_use]
    pub fn best_image_url(&self) -> &str {
        self.image_url_hq.as_deref().unwrap_or(&self.image_url)
    }
}

/// Which pool a candidate was drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    /// Recommendations of the most recently visited detail view
    Related,
    /// Siblings preserved from previously abandoned views
    Deferred,
    /// Seed search results
    Search,
}

impl fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Related => write!(f, "related"),
            Self::Deferred => write!(f, "history/deferred"),
            Self::Search => write!(f, "search"),
        }
    }
}

/// A stub pulled out of a pool, tagged with where it came from
#[derive(Debug, Clone)]
pub struct Candidate {
    pub stub: ItemStub,
    pub source: CandidateSource,
}

/// One qualifying discovery, as written to the result sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryRecord {
    /// 1-based position within the run
    pub index: usize,
    pub image_url: String,
    pub score: u64,
    /// Detail-page address the image was discovered on
    pub source_url: String,
    pub recorded_at: DateTime<Utc>,
}

/// Outcome of a completed, exhausted, or cancelled run
#[derive(Debug, Clone, Serialize)]
pub struct HarvestSummary {
    /// Detail views navigated to (including failed navigations)
    pub visited: usize,
    /// Qualifying discoveries recorded this run
    pub recorded: usize,
    /// Browser session restarts triggered by the recovery state machine
    pub session_restarts: usize,
    /// Seed-view reopens after pool exhaustion
    pub reseeds: usize,
    pub cancelled: bool,
    pub elapsed_secs: f64,
}
