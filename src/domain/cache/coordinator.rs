//! Transaction-scoped coordination of staged cache views

use std::collections::HashMap;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use super::repository::{decode, encode};
use super::{CacheKey, NamedCache, StagedCacheView};
use crate::domain::DomainError;

/// Owns the staged view of every named cache touched by one transaction.
///
/// Views are created on first use. [`commit_all`](Self::commit_all) and
/// [`rollback_all`](Self::rollback_all) end the transaction: the views are
/// drained and the coordinator starts over with a new transaction id.
#[derive(Debug)]
pub struct CacheCoordinator {
    transaction_id: Uuid,
    views: HashMap<String, StagedCacheView>,
}

impl CacheCoordinator {
    pub fn new() -> Self {
        Self {
            transaction_id: Uuid::new_v4(),
            views: HashMap::new(),
        }
    }

    pub fn transaction_id(&self) -> Uuid {
        self.transaction_id
    }

    /// Ids of the caches touched in the current transaction
    pub fn staged_caches(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.views.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn clear(&mut self, cache: &NamedCache) {
        debug!(tx = %self.transaction_id, cache = cache.id(), "Staging cache clear");
        self.view(cache).clear();
    }

    pub async fn get<V>(&mut self, cache: &NamedCache, key: &CacheKey) -> Result<Option<V>, DomainError>
    where
        V: DeserializeOwned,
    {
        match self.view(cache).get(key).await? {
            Some(data) => Ok(Some(decode(&data)?)),
            None => Ok(None),
        }
    }

    pub fn put<V>(&mut self, cache: &NamedCache, key: CacheKey, value: &V) -> Result<(), DomainError>
    where
        V: Serialize + ?Sized,
    {
        let data = encode(value)?;
        self.view(cache).put(key, data);
        Ok(())
    }

    pub fn remove(&mut self, cache: &NamedCache, key: CacheKey) {
        self.view(cache).remove(key);
    }

    /// Commits every staged view.
    ///
    /// All views are attempted even if one fails; the first failure is returned.
    pub async fn commit_all(&mut self) -> Result<(), DomainError> {
        let transaction_id = self.transaction_id;
        let mut first_error = None;

        for (id, mut view) in self.finish() {
            if let Err(e) = view.commit().await {
                warn!(tx = %transaction_id, cache = %id, error = %e, "Failed to commit cache view");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Discards every staged view; the shared caches are not touched
    pub fn rollback_all(&mut self) {
        for (_, mut view) in self.finish() {
            view.rollback();
        }
    }

    fn finish(&mut self) -> HashMap<String, StagedCacheView> {
        let views = std::mem::take(&mut self.views);
        debug!(tx = %self.transaction_id, views = views.len(), "Ending cache transaction");
        self.transaction_id = Uuid::new_v4();
        views
    }

    fn view(&mut self, cache: &NamedCache) -> &mut StagedCacheView {
        self.views
            .entry(cache.id().to_string())
            .or_insert_with(|| StagedCacheView::new(cache.clone()))
    }
}

impl Default for CacheCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::{Cache, CacheExt, MockCache};
    use std::sync::Arc;

    fn named(id: &str) -> (Arc<MockCache>, NamedCache) {
        let store = Arc::new(MockCache::new());
        (store.clone(), NamedCache::new(id, store))
    }

    fn key(id: i64) -> CacheKey {
        CacheKey::from_components([id])
    }

    #[tokio::test]
    async fn test_isolated_until_commit() {
        let (store, cache) = named("users");
        let mut tx1 = CacheCoordinator::new();
        let mut tx2 = CacheCoordinator::new();

        tx1.put(&cache, key(1), &vec!["ada"]).unwrap();

        let own: Option<Vec<String>> = tx1.get(&cache, &key(1)).await.unwrap();
        assert_eq!(own, Some(vec!["ada".to_string()]));

        let other: Option<Vec<String>> = tx2.get(&cache, &key(1)).await.unwrap();
        assert_eq!(other, None);

        tx1.commit_all().await.unwrap();

        let other: Option<Vec<String>> = tx2.get(&cache, &key(1)).await.unwrap();
        assert_eq!(other, Some(vec!["ada".to_string()]));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_rollback_has_no_shared_effect() {
        let (store, cache) = named("users");
        store.put(&key(9).storage_key(), &"kept").await.unwrap();

        let mut tx = CacheCoordinator::new();
        tx.put(&cache, key(1), &"dropped").unwrap();
        tx.clear(&cache);
        tx.rollback_all();

        let mut next = CacheCoordinator::new();
        let dropped: Option<String> = next.get(&cache, &key(1)).await.unwrap();
        let kept: Option<String> = next.get(&cache, &key(9)).await.unwrap();

        assert_eq!(dropped, None);
        assert_eq!(kept, Some("kept".to_string()));
        assert_eq!(store.clear_count(), 0);
    }

    #[tokio::test]
    async fn test_commit_without_views_is_noop() {
        let mut tx = CacheCoordinator::new();

        tx.commit_all().await.unwrap();
        tx.commit_all().await.unwrap();
        tx.rollback_all();

        assert!(tx.is_empty());
    }

    #[tokio::test]
    async fn test_views_created_lazily_per_cache() {
        let (_, users) = named("users");
        let (_, orders) = named("orders");
        let mut tx = CacheCoordinator::new();

        let _: Option<String> = tx.get(&users, &key(1)).await.unwrap();
        tx.put(&orders, key(1), &1).unwrap();
        tx.put(&users, key(2), &2).unwrap();

        assert_eq!(tx.staged_caches(), vec!["orders", "users"]);
    }

    #[tokio::test]
    async fn test_commit_attempts_every_view() {
        let (broken_store, broken) = named("broken");
        let (healthy_store, healthy) = named("healthy");
        broken_store.fail_with("disk full");

        let mut tx = CacheCoordinator::new();
        tx.put(&broken, key(1), &1).unwrap();
        tx.put(&healthy, key(1), &1).unwrap();

        let result = tx.commit_all().await;

        assert!(matches!(result, Err(DomainError::Cache { .. })));
        assert!(healthy_store.contains(&key(1).storage_key()));
        assert!(tx.is_empty());
    }

    #[tokio::test]
    async fn test_transaction_id_changes_after_commit() {
        let mut tx = CacheCoordinator::new();
        let first = tx.transaction_id();

        tx.commit_all().await.unwrap();

        assert_ne!(first, tx.transaction_id());
    }

    #[tokio::test]
    async fn test_clear_then_commit_empties_shared_cache() {
        let (store, cache) = named("users");
        store.put_raw(&key(1).storage_key(), "1").await.unwrap();

        let mut tx = CacheCoordinator::new();
        tx.clear(&cache);
        tx.put(&cache, key(2), &2).unwrap();

        let hidden: Option<i64> = tx.get(&cache, &key(2)).await.unwrap();
        assert_eq!(hidden, None);

        tx.commit_all().await.unwrap();

        assert!(!store.contains(&key(1).storage_key()));
        let visible: Option<i64> = CacheCoordinator::new().get(&cache, &key(2)).await.unwrap();
        assert_eq!(visible, Some(2));
    }
}
