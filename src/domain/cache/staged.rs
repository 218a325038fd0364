//! Per-transaction overlay over one named cache

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::{CacheKey, NamedCache};
use crate::domain::DomainError;

/// Buffers one transaction's writes, removals and clear requests against a
/// named cache. Nothing reaches the shared store before [`commit`](Self::commit).
#[derive(Debug)]
pub struct StagedCacheView {
    cache: NamedCache,
    clear_on_commit: bool,
    pending_writes: HashMap<CacheKey, String>,
    pending_removals: HashSet<CacheKey>,
}

impl StagedCacheView {
    pub fn new(cache: NamedCache) -> Self {
        Self {
            cache,
            clear_on_commit: false,
            pending_writes: HashMap::new(),
            pending_removals: HashSet::new(),
        }
    }

    pub fn cache(&self) -> &NamedCache {
        &self.cache
    }

    pub fn is_cleared(&self) -> bool {
        self.clear_on_commit
    }

    /// Number of writes waiting for commit
    pub fn pending_writes(&self) -> usize {
        self.pending_writes.len()
    }

    /// Reads through the transaction-local state to the shared store
    pub async fn get(&self, key: &CacheKey) -> Result<Option<String>, DomainError> {
        if self.clear_on_commit || self.pending_removals.contains(key) {
            return Ok(None);
        }

        if let Some(value) = self.pending_writes.get(key) {
            return Ok(Some(value.clone()));
        }

        self.cache.store().get_raw(&key.storage_key()).await
    }

    pub fn put(&mut self, key: CacheKey, value: String) {
        self.pending_removals.remove(&key);
        self.pending_writes.insert(key, value);
    }

    pub fn remove(&mut self, key: CacheKey) {
        self.pending_writes.remove(&key);
        self.pending_removals.insert(key);
    }

    /// Marks the cache for clearing at commit and drops everything staged so far
    pub fn clear(&mut self) {
        self.clear_on_commit = true;
        self.pending_writes.clear();
        self.pending_removals.clear();
    }

    /// Applies the staged state to the shared store.
    ///
    /// Local state is reset whether or not the store accepted every change.
    pub async fn commit(&mut self) -> Result<(), DomainError> {
        let clear = std::mem::take(&mut self.clear_on_commit);
        let removals = std::mem::take(&mut self.pending_removals);
        let writes = std::mem::take(&mut self.pending_writes);
        let store = self.cache.store();

        if clear {
            store.clear().await?;
        }

        for key in &removals {
            store.remove(&key.storage_key()).await?;
        }

        for (key, value) in &writes {
            store.put_raw(&key.storage_key(), value).await?;
        }

        debug!(
            cache = self.cache.id(),
            cleared = clear,
            removed = removals.len(),
            written = writes.len(),
            "Committed staged cache view"
        );

        Ok(())
    }

    /// Discards the staged state without touching the shared store
    pub fn rollback(&mut self) {
        debug!(
            cache = self.cache.id(),
            discarded = self.pending_writes.len(),
            "Rolled back staged cache view"
        );

        self.clear_on_commit = false;
        self.pending_writes.clear();
        self.pending_removals.clear();
    }
}
