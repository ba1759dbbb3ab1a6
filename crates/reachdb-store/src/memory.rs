//! In-process snapshot store used by tests and local development.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reachdb_core::Snapshot;

use crate::{SnapshotStore, StoreError};

/// Snapshot history held in memory.
///
/// Per key, snapshots live in a `BTreeMap` ordered by `captured_at`, which
/// gives the upsert-by-`(profile_key, captured_at)` semantics for free:
/// inserting an existing timestamp replaces the earlier record.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<HashMap<String, BTreeMap<DateTime<Utc>, Snapshot>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored snapshots across all keys.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .map(BTreeMap::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn append(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner
            .entry(snapshot.profile_key.clone())
            .or_default()
            .insert(snapshot.captured_at, snapshot.clone());
        Ok(())
    }

    async fn latest(&self, profile_key: &str) -> Result<Option<Snapshot>, StoreError> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Ok(inner
            .get(profile_key)
            .and_then(|history| history.values().next_back().cloned()))
    }

    async fn history(&self, profile_key: &str, limit: usize) -> Result<Vec<Snapshot>, StoreError> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Ok(inner
            .get(profile_key)
            .map(|history| history.values().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn recent_keys(&self, since: DateTime<Utc>) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let mut keys: Vec<String> = inner
            .iter()
            .filter(|(_, history)| history.keys().next_back().is_some_and(|ts| *ts > since))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        Ok(keys)
    }
}
