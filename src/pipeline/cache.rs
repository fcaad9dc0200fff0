use std::{collections::HashMap, future::Future, hash::Hash, sync::Arc};

use tokio::sync::{Mutex, OnceCell};

/// Memoizes lookups shared by concurrent tasks.
///
/// Each key gets its own cell: the first task asking for a key runs the
/// fetch, tasks asking for the same key meanwhile wait for that result
/// instead of issuing a second request. Clones share the same entries.
#[derive(Debug)]
pub struct LookupCache<K, V> {
    entries: Arc<Mutex<HashMap<K, Arc<OnceCell<V>>>>>,
}

impl<K, V> Clone for LookupCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<K, V> Default for LookupCache<K, V> {
    fn default() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K, V> LookupCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_fetch<F, Fut>(&self, key: K, fetch: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        let cell = {
            let mut entries = self.entries.lock().await;
            Arc::clone(entries.entry(key).or_default())
        };
        cell.get_or_init(fetch).await.clone()
    }

    /// The stored value for `key`, if a fetch for it has completed.
    pub async fn get(&self, key: &K) -> Option<V> {
        let cell = self.entries.lock().await.get(key).cloned()?;
        cell.get().cloned()
    }

    /// Number of keys with a completed fetch.
    pub async fn len(&self) -> usize {
        self.entries
            .lock()
            .await
            .values()
            .filter(|cell| cell.initialized())
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
