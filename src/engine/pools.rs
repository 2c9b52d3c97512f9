//! Candidate pools and the selection policy.
//!
//! Three ordered pools feed the traversal: the primary pool (seed search
//! results), the related pool (recommendations of the current detail view,
//! replaced wholesale on every navigation), and the deferred pool (siblings
//! preserved when the walk moves away from their source view). A run-scoped
//! visited set guards every selection.
//!
//! Selection is a strict fallback chain, not a weighted blend: related
//! first, then deferred, then primary, choosing uniformly at random inside
//! the first tier that has an unvisited candidate.

use log::debug;
use rand::Rng;
use std::collections::HashSet;

use super::types::{Candidate, CandidateSource, ItemStub};

#[derive(Debug, Default)]
pub struct CandidatePools {
    primary: Vec<ItemStub>,
    related: Vec<ItemStub>,
    deferred: Vec<ItemStub>,
    visited: HashSet<String>,
}

impl CandidatePools {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of urls navigated to (or discarded as failed) this run
    #[must_use]
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    #[must_use]
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// (primary, related, deferred) pool sizes, for logging
    #[must_use]
    pub fn sizes(&self) -> (usize, usize, usize) {
        (self.primary.len(), self.related.len(), self.deferred.len())
    }

    fn holds_url(&self, url: &str) -> bool {
        self.primary.iter().chain(&self.related).chain(&self.deferred)
            .any(|s| s.url == url)
    }

    /// Merge freshly listed stubs into the primary pool.
    ///
    /// Stubs whose url is already visited or already held by any pool are
    /// dropped. Returns the number actually added, which is what the refill
    /// step uses to distinguish new content from exhaustion.
    pub fn merge_primary(&mut self, stubs: Vec<ItemStub>) -> usize {
        let mut added = 0;
        for stub in stubs {
            if stub.url.is_empty() || self.visited.contains(&stub.url) || self.holds_url(&stub.url)
            {
                continue;
            }
            self.primary.push(stub);
            added += 1;
        }
        debug!("merged {added} new stubs into primary pool");
        added
    }

    /// Replace the related pool with the current detail view's recommendations.
    ///
    /// Full replacement, never a merge: the related pool reflects exactly one
    /// view at a time. An empty slice is a dead end, not an error.
    pub fn install_related(&mut self, stubs: Vec<ItemStub>) {
        self.related = stubs
            .into_iter()
            .filter(|s| !s.url.is_empty() && !self.visited.contains(&s.url))
            .collect();
    }

    /// Select the next candidate: related, else deferred, else primary,
    /// uniformly at random within the tier. Returns None when no pool holds
    /// an unvisited candidate.
    ///
    /// The chosen stub leaves its pool and its url enters the visited set
    /// immediately; a navigation failure later does not re-admit it.
    pub fn select_next<R: Rng>(&mut self, rng: &mut R) -> Option<Candidate> {
        for (source, pool) in [
            (CandidateSource::Related, &mut self.related),
            (CandidateSource::Deferred, &mut self.deferred),
            (CandidateSource::Search, &mut self.primary),
        ] {
            let eligible: Vec<usize> = pool
                .iter()
                .enumerate()
                .filter(|(_, s)| !self.visited.contains(&s.url))
                .map(|(i, _)| i)
                .collect();
            if eligible.is_empty() {
                continue;
            }
            let idx = eligible[rng.random_range(0..eligible.len())];
            let stub = pool.remove(idx);
            self.visited.insert(stub.url.clone());
            debug!("selected candidate from {source} pool: {}", stub.url);
            return Some(Candidate { stub, source });
        }
        None
    }

    /// Preserve the unexplored siblings of a just-consumed candidate.
    ///
    /// The remaining unvisited stubs of the candidate's source pool move
    /// into the deferred pool before the engine navigates away from their
    /// view. A candidate drawn from the deferred pool has nothing to move.
    pub fn defer_siblings(&mut self, source: CandidateSource) {
        let pool = match source {
            CandidateSource::Related => &mut self.related,
            CandidateSource::Search => &mut self.primary,
            CandidateSource::Deferred => return,
        };
        let mut displaced: Vec<ItemStub> = pool
            .drain(..)
            .filter(|s| !self.visited.contains(&s.url))
            .collect();
        displaced.retain(|s| !self.deferred.iter().any(|d| d.url == s.url));
        if !displaced.is_empty() {
            debug!("deferring {} siblings from {source} pool", displaced.len());
            self.deferred.extend(displaced);
        }
    }

    /// Reset for a re-seed: all pools cleared, visited set kept.
    pub fn clear_pools(&mut self) {
        self.primary.clear();
        self.related.clear();
        self.deferred.clear();
    }
}
