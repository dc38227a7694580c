//! In-process TTL cache
//!
//! Fresh values live in a mini-moka cache with a time-to-live. A cache built
//! with [`TtlCache::with_last_known`] also keeps the last value per key in a
//! second, size-bounded cache without expiry, so a caller can serve it stale
//! when its source is down.

use std::future::Future;
use std::hash::Hash;
use std::time::Duration;

use mini_moka::sync::Cache;

/// Entries kept per cache before eviction
pub const DEFAULT_CAPACITY: u64 = 10_000;

/// Lookup result
#[derive(Debug, Clone, PartialEq)]
pub enum Cached<V> {
    Fresh(V),
    Stale(V),
    Missing,
}

#[derive(Clone)]
pub struct TtlCache<K, V> {
    fresh: Cache<K, V>,
    last_known: Option<Cache<K, V>>,
    ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Fresh values only
    pub fn new(ttl: Duration) -> Self {
        Self {
            fresh: Cache::builder()
                .max_capacity(DEFAULT_CAPACITY)
                .time_to_live(ttl)
                .build(),
            last_known: None,
            ttl,
        }
    }

    /// Fresh values plus the last known value per key
    pub fn with_last_known(ttl: Duration) -> Self {
        Self {
            last_known: Some(Cache::builder().max_capacity(DEFAULT_CAPACITY).build()),
            ..Self::new(ttl)
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn lookup(&self, key: &K) -> Cached<V> {
        if let Some(value) = self.fresh.get(key) {
            return Cached::Fresh(value);
        }
        match self.last_known.as_ref().and_then(|c| c.get(key)) {
            Some(value) => Cached::Stale(value),
            None => Cached::Missing,
        }
    }

    /// Fresh value only
    pub fn get(&self, key: &K) -> Option<V> {
        self.fresh.get(key)
    }

    pub fn insert(&self, key: K, value: V)
    where
        K: Clone,
    {
        if let Some(last_known) = &self.last_known {
            last_known.insert(key.clone(), value.clone());
        }
        self.fresh.insert(key, value);
    }

    /// Drop the fresh value. A last known value stays for stale reads.
    pub fn invalidate(&self, key: &K) {
        self.fresh.invalidate(key);
    }

    /// Fresh cached value, or fetch and store. Errors are not cached.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: K, fetch: F) -> Result<V, E>
    where
        K: Clone,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let value = fetch().await?;
        self.insert(key, value.clone());
        Ok(value)
    }
}
