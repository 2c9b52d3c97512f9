//! Traversal engine: candidate pools, selection, recovery, and the run loop.

pub mod identity;
pub mod pools;
pub mod recovery;
pub mod traversal;
pub mod types;

pub use pools::CandidatePools;
pub use recovery::{RESTART_THRESHOLD, SessionHealth, SessionState};
pub use traversal::TraversalEngine;
pub use types::{Candidate, CandidateSource, DiscoveryRecord, HarvestSummary, ItemStub};
