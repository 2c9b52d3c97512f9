//! Durable history of recorded item identities.
//!
//! The history store is what prevents the same popular item from being
//! recorded twice across runs, even when it is rediscovered through a
//! different traversal path. Writes are immediate, never batched, so a
//! crashed run loses no recorded identity.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Durable set of already-recorded item identities, persisted across runs
#[allow(async_fn_in_trait)]
pub trait HistoryStore {
    fn contains(&self, id: &str) -> bool;
    /// Add an identity and persist it before returning
    async fn add(&mut self, id: &str) -> Result<()>;
    fn count(&self) -> usize;
}

/// On-disk shape of the history file
#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryFile {
    pins: Vec<String>,
    total_count: usize,
    last_updated: Option<DateTime<Utc>>,
}

/// History store backed by a single JSON file
#[derive(Debug)]
pub struct JsonHistoryStore {
    path: PathBuf,
    pins: HashSet<String>,
}

impl JsonHistoryStore {
    /// Load the history file, or start empty when it does not exist yet
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let pins = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => {
                let file: HistoryFile = serde_json::from_str(&raw)
                    .with_context(|| format!("corrupt history file {}", path.display()))?;
                file.pins.into_iter().collect()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no history file at {}, starting empty", path.display());
                HashSet::new()
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read history file {}", path.display()));
            }
        };
        info!("history loaded: {} previously recorded items", pins.len());
        Ok(Self { path, pins })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self) -> Result<()> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("failed to create history dir {}", dir.display()))?;
        }
        let mut pins: Vec<&String> = self.pins.iter().collect();
        pins.sort();
        let file = HistoryFile {
            pins: pins.into_iter().cloned().collect(),
            total_count: self.pins.len(),
            last_updated: Some(Utc::now()),
        };
        let json = serde_json::to_string_pretty(&file)?;
        tokio::fs::write(&self.path, json)
            .await
            .with_context(|| format!("failed to write history file {}", self.path.display()))
    }
}

impl HistoryStore for JsonHistoryStore {
    fn contains(&self, id: &str) -> bool {
        self.pins.contains(id)
    }

    async fn add(&mut self, id: &str) -> Result<()> {
        if self.pins.insert(id.to_string()) {
            self.persist().await?;
            debug!("history: added {id}");
        }
        Ok(())
    }

    fn count(&self) -> usize {
        self.pins.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonHistoryStore::load(dir.path().join("history.json"))
            .await
            .unwrap();
        assert_eq!(store.count(), 0);
        assert!(!store.contains("123"));
    }

    #[tokio::test]
    async fn add_persists_immediately() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");

        let mut store = JsonHistoryStore::load(&path).await.unwrap();
        store.add("123").await.unwrap();
        store.add("456").await.unwrap();
        store.add("123").await.unwrap(); // idempotent

        // A fresh load sees everything the first store wrote.
        let reloaded = JsonHistoryStore::load(&path).await.unwrap();
        assert_eq!(reloaded.count(), 2);
        assert!(reloaded.contains("123"));
        assert!(reloaded.contains("456"));
        assert!(!reloaded.contains("789"));
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        tokio::fs::write(&path, "not json").await.unwrap();
        assert!(JsonHistoryStore::load(&path).await.is_err());
    }
}
