//! In-memory cache mapping query fingerprints to fetched record sets.
//!
//! Entries never expire in the background; freshness is a pure function of
//! wall-clock time re-evaluated on every read, and removal only happens when
//! [`CacheStore::evict_expired`] or [`CacheStore::clear`] is invoked
//! explicitly. An expired entry is deliberately retained so the source
//! service can serve it as stale data when a refresh fails.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One cached record set, immutable once written.
///
/// A refresh replaces the whole entry atomically under the store's key;
/// concurrent readers either see the old entry or the new one, never a mix.
#[derive(Debug, Clone)]
pub struct CacheEntry<R> {
    pub records: Vec<R>,
    pub fetched_at: DateTime<Utc>,
}

/// Per-key summary exposed by the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntryInfo {
    pub fetched_at: String,
    pub size: usize,
    pub age_seconds: i64,
    pub fresh: bool,
}

/// Snapshot of the whole store for observability.
#[derive(Debug, Clone, Serialize)]
pub struct CacheInfo {
    pub cached_entries: usize,
    pub cache_keys: Vec<String>,
    pub cache_timeout_secs: u64,
    pub details: BTreeMap<String, CacheEntryInfo>,
}

/// In-memory mapping from fingerprint to `(records, fetched_at)`.
///
/// At most one live entry exists per key. All mutation goes through
/// [`put_at`](CacheStore::put_at), [`evict_expired`](CacheStore::evict_expired)
/// and [`clear`](CacheStore::clear), each individually atomic.
#[derive(Debug)]
pub struct CacheStore<R> {
    entries: RwLock<HashMap<String, Arc<CacheEntry<R>>>>,
}

impl<R> Default for CacheStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> CacheStore<R> {
    pub fn new() -> Self {
        Self { entries: RwLock::new(HashMap::new()) }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<CacheEntry<R>>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Arc<CacheEntry<R>>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// O(1) lookup with no side effects. Returns expired entries too.
    pub fn get(&self, key: &str) -> Option<Arc<CacheEntry<R>>> {
        self.read().get(key).cloned()
    }

    /// False if the key is absent, otherwise `now - fetched_at < timeout`.
    pub fn is_fresh(&self, key: &str, timeout: Duration) -> bool {
        self.read()
            .get(key)
            .is_some_and(|entry| entry_is_fresh(entry, timeout, Utc::now()))
    }

    /// Store `records` under `key`, stamped with the current wall-clock time.
    pub fn put(&self, key: &str, records: Vec<R>) {
        self.put_at(key, records, Utc::now());
    }

    /// Store `records` under `key` with an explicit fetch timestamp.
    ///
    /// Replacement is monotonic in time: a write carrying an older timestamp
    /// than the live entry is dropped, so a slow fetch that loses the race
    /// cannot roll the entry backwards.
    pub fn put_at(&self, key: &str, records: Vec<R>, fetched_at: DateTime<Utc>) {
        let mut entries = self.write();
        if let Some(existing) = entries.get(key)
            && existing.fetched_at > fetched_at
        {
            tracing::debug!(key, "dropping out-of-date cache write");
            return;
        }
        entries.insert(key.to_string(), Arc::new(CacheEntry { records, fetched_at }));
    }

    /// Remove every entry whose age exceeds `timeout`.
    ///
    /// Returns the number of entries removed.
    pub fn evict_expired(&self, timeout: Duration) -> usize {
        let now = Utc::now();
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|_, entry| entry_is_fresh(entry, timeout, now));
        let removed = before - entries.len();
        if removed > 0 {
            tracing::info!(removed, "evicted expired cache entries");
        }
        removed
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.write().clear();
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Snapshot of entry count, keys and per-key freshness.
    pub fn info(&self, timeout: Duration) -> CacheInfo {
        let now = Utc::now();
        let entries = self.read();

        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();

        let details = entries
            .iter()
            .map(|(key, entry)| {
                let info = CacheEntryInfo {
                    fetched_at: entry.fetched_at.to_rfc3339(),
                    size: entry.records.len(),
                    age_seconds: now.signed_duration_since(entry.fetched_at).num_seconds(),
                    fresh: entry_is_fresh(entry, timeout, now),
                };
                (key.clone(), info)
            })
            .collect();

        CacheInfo {
            cached_entries: entries.len(),
            cache_keys: keys,
            cache_timeout_secs: timeout.as_secs(),
            details,
        }
    }
}

fn entry_is_fresh<R>(entry: &CacheEntry<R>, timeout: Duration, now: DateTime<Utc>) -> bool {
    let timeout = chrono::Duration::from_std(timeout).unwrap_or(chrono::Duration::MAX);
    now.signed_duration_since(entry.fetched_at) < timeout
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(600);

    fn backdated(secs: i64) -> DateTime<Utc> {
        Utc::now() - chrono::Duration::seconds(secs)
    }

    #[test]
    fn test_get_missing() {
        let store: CacheStore<u32> = CacheStore::new();
        assert!(store.get("absent").is_none());
        assert!(!store.is_fresh("absent", TIMEOUT));
    }

    #[test]
    fn test_put_then_fresh() {
        let store = CacheStore::new();
        store.put("python_daily", vec![1, 2, 3, 4, 5]);
        assert!(store.is_fresh("python_daily", TIMEOUT));
        assert_eq!(store.get("python_daily").unwrap().records.len(), 5);
    }

    #[test]
    fn test_freshness_is_time_based_without_writes() {
        let store = CacheStore::new();
        store.put_at("python_daily", vec![1, 2, 3, 4, 5], backdated(599));
        assert!(store.is_fresh("python_daily", TIMEOUT));

        store.put_at("go_weekly", vec![1], backdated(601));
        assert!(!store.is_fresh("go_weekly", TIMEOUT));
        // expired entries are retained, not removed
        assert!(store.get("go_weekly").is_some());
    }

    #[test]
    fn test_put_replaces_atomically() {
        let store = CacheStore::new();
        store.put("k", vec![1]);
        store.put("k", vec![2, 3]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("k").unwrap().records, vec![2, 3]);
    }

    #[test]
    fn test_put_is_monotonic_in_time() {
        let store = CacheStore::new();
        let newer = Utc::now();
        store.put_at("k", vec![2], newer);
        // a racing fetch that started earlier finishes late and loses
        store.put_at("k", vec![1], backdated(30));
        let entry = store.get("k").unwrap();
        assert_eq!(entry.records, vec![2]);
        assert_eq!(entry.fetched_at, newer);
    }

    #[test]
    fn test_evict_expired_removes_exactly_stale_keys() {
        let store = CacheStore::new();
        store.put_at("fresh_a", vec![1], backdated(10));
        store.put_at("fresh_b", vec![2], backdated(599));
        store.put_at("stale_a", vec![3], backdated(601));
        store.put_at("stale_b", vec![4], backdated(5000));

        let removed = store.evict_expired(TIMEOUT);
        assert_eq!(removed, 2);
        assert!(store.get("fresh_a").is_some());
        assert!(store.get("fresh_b").is_some());
        assert!(store.get("stale_a").is_none());
        assert!(store.get("stale_b").is_none());
    }

    #[test]
    fn test_clear() {
        let store = CacheStore::new();
        store.put("a", vec![1]);
        store.put("b", vec![2]);
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_info_snapshot() {
        let store = CacheStore::new();
        store.put_at("python_daily", vec![1, 2, 3], backdated(100));
        store.put_at("go_weekly", vec![4], backdated(700));

        let info = store.info(TIMEOUT);
        assert_eq!(info.cached_entries, 2);
        assert_eq!(info.cache_keys, vec!["go_weekly".to_string(), "python_daily".to_string()]);
        assert_eq!(info.cache_timeout_secs, 600);

        let python = &info.details["python_daily"];
        assert_eq!(python.size, 3);
        assert!(python.fresh);
        assert!(python.age_seconds >= 100);

        assert!(!info.details["go_weekly"].fresh);
    }
}
