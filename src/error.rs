//! Error types for harvest operations.
//!
//! Transient navigation failures never show up here: the traversal engine
//! absorbs them through its session-recovery state machine. Only startup
//! configuration problems, unrecoverable driver failures, and storage
//! failures surface to the caller.

use thiserror::Error;

/// Top-level error type for a harvest run
#[derive(Debug, Error)]
pub enum HarvestError {
    /// Invalid or missing configuration, fatal before traversal starts
    #[error("configuration error: {0}")]
    Config(String),

    /// The browser session failed and could not be restarted
    #[error("page driver error: {0}")]
    Driver(String),

    /// History store or result sink could not be written
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<anyhow::Error> for HarvestError {
    fn from(err: anyhow::Error) -> Self {
        // Use {:#} to preserve the full error chain with context
        Self::Driver(format!("{err:#}"))
    }
}

/// Convenience alias for Result with `HarvestError`
pub type HarvestResult<T> = Result<T, HarvestError>;
