//! Source service: the get-or-refresh/fallback policy engine.
//!
//! One service instance exists per source site. It composes the fetch client,
//! the site extractor and the cache store, and implements the serving policy:
//!
//! 1. Fresh cache entry: return it, no network call.
//! 2. Otherwise refresh: fetch under a worker-pool permit, extract, store.
//! 3. On fetch or extraction failure: serve the prior entry even if expired
//!    (serve-stale-on-error), else the extractor's static fallback payload.
//! 4. A request arriving at a completely empty cache runs a capped fetch
//!    under a hard deadline and always schedules a detached full-fidelity
//!    refresh; the caller is never blocked past the deadline.
//!
//! Concurrent callers for the same key are coalesced through a per-key lock;
//! whoever acquires it second finds the cache already refreshed. Racing
//! writes that do slip through converge via the store's last-write-wins put.

pub mod warm;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Semaphore, oneshot};
use tokio::task::JoinHandle;
use trendlens_core::{CacheStore, Error, Fingerprint};

use crate::extract::Extractor;
use crate::fetch::PageFetcher;

/// Record cap for the degraded first request.
const DEGRADED_MAX_ITEMS: usize = 10;

/// How many fallback records a deadline-expired response carries.
const FALLBACK_PREVIEW_ITEMS: usize = 5;

/// How a response was produced. Surfaced to the API as body fields, never as
/// an error status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Fresh cache entry, no network call.
    CacheHit,
    /// Fetched and extracted during this call.
    Fetched,
    /// Refresh failed; an older (possibly expired) entry was served.
    Stale,
    /// Refresh failed with no prior entry; static placeholder records.
    Fallback,
    /// First-request deadline elapsed; minimal records returned while the
    /// fetch continues in the background.
    Partial,
}

impl Outcome {
    pub fn is_cached(self) -> bool {
        matches!(self, Outcome::CacheHit)
    }

    pub fn is_partial(self) -> bool {
        matches!(self, Outcome::Partial)
    }

    /// True when placeholder or stale data was substituted for a failure.
    pub fn is_degraded(self) -> bool {
        matches!(self, Outcome::Stale | Outcome::Fallback)
    }
}

/// Records plus how they were obtained.
///
/// Always present: a failed refresh yields stale or fallback records, never
/// an error.
#[derive(Debug, Clone)]
pub struct DataResponse<R> {
    pub records: Vec<R>,
    pub outcome: Outcome,
}

/// Policy knobs, derived from `AppConfig` by the caller.
#[derive(Debug, Clone, Copy)]
pub struct SourceOptions {
    /// How long a cache entry stays fresh.
    pub cache_timeout: Duration,
    /// Record cap per query at full fidelity.
    pub max_items: usize,
    /// Hard deadline for a request arriving at an empty cache.
    pub first_request_deadline: Duration,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            cache_timeout: Duration::from_secs(600),
            max_items: 25,
            first_request_deadline: Duration::from_secs(3),
        }
    }
}

/// Per-source composition of fetch client, extractor and cache store.
///
/// Cheap to clone; clones share the cache, the worker pool and the in-flight
/// key locks.
pub struct SourceService<X: Extractor> {
    extractor: Arc<X>,
    fetcher: Arc<dyn PageFetcher>,
    cache: Arc<CacheStore<X::Record>>,
    workers: Arc<Semaphore>,
    in_flight: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
    background: Arc<Mutex<Vec<JoinHandle<()>>>>,
    opts: SourceOptions,
}

impl<X: Extractor> Clone for SourceService<X> {
    fn clone(&self) -> Self {
        Self {
            extractor: Arc::clone(&self.extractor),
            fetcher: Arc::clone(&self.fetcher),
            cache: Arc::clone(&self.cache),
            workers: Arc::clone(&self.workers),
            in_flight: Arc::clone(&self.in_flight),
            background: Arc::clone(&self.background),
            opts: self.opts,
        }
    }
}

impl<X: Extractor> SourceService<X> {
    /// Create a service with its own cache store and worker pool.
    ///
    /// `max_workers` bounds concurrent outbound fetches for this source;
    /// callers beyond capacity queue for a free slot rather than failing.
    pub fn new(extractor: X, fetcher: Arc<dyn PageFetcher>, max_workers: usize, opts: SourceOptions) -> Self {
        Self {
            extractor: Arc::new(extractor),
            fetcher,
            cache: Arc::new(CacheStore::new()),
            workers: Arc::new(Semaphore::new(max_workers.max(1))),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            background: Arc::new(Mutex::new(Vec::new())),
            opts,
        }
    }

    pub fn source_name(&self) -> &'static str {
        self.extractor.name()
    }

    pub fn cache(&self) -> &CacheStore<X::Record> {
        &self.cache
    }

    pub fn options(&self) -> SourceOptions {
        self.opts
    }

    /// The extractor's static placeholder payload.
    pub fn fallback(&self) -> Vec<X::Record> {
        self.extractor.fallback()
    }

    pub fn warm_queries(&self) -> Vec<X::Query> {
        self.extractor.warm_queries()
    }

    /// Get records for `query` per the serving policy. Never fails and never
    /// returns "no data": degraded states are encoded in the outcome.
    pub async fn fetch_data(&self, query: &X::Query) -> DataResponse<X::Record> {
        let key = query.fingerprint();

        if let Some(hit) = self.cache_hit(&key) {
            return hit;
        }

        if self.cache.is_empty() {
            return self.first_request(key, query.clone()).await;
        }

        self.refresh(&key, query, self.opts.max_items, false).await
    }

    /// Refresh `query` at full fidelity, bypassing the degraded first-request
    /// path. Used by the cache warmer.
    pub async fn refresh_query(&self, query: &X::Query) -> DataResponse<X::Record> {
        let key = query.fingerprint();
        self.refresh(&key, query, self.opts.max_items, false).await
    }

    fn cache_hit(&self, key: &str) -> Option<DataResponse<X::Record>> {
        if !self.cache.is_fresh(key, self.opts.cache_timeout) {
            return None;
        }
        self.cache
            .get(key)
            .map(|entry| DataResponse { records: entry.records.clone(), outcome: Outcome::CacheHit })
    }

    /// Refresh `key` from the network, coalescing concurrent same-key callers
    /// behind one fetch. `force` skips the post-lock freshness shortcut and is
    /// used by the full-fidelity follow-up to a capped first request.
    async fn refresh(&self, key: &str, query: &X::Query, max_items: usize, force: bool) -> DataResponse<X::Record> {
        let lock = self.key_lock(key).await;
        let _guard = lock.lock().await;

        // a coalesced caller finds the work already done
        if !force && let Some(hit) = self.cache_hit(key) {
            return hit;
        }

        match self.fetch_and_extract(query, max_items).await {
            Ok(records) => {
                self.cache.put(key, records.clone());
                tracing::debug!(source = self.source_name(), key, count = records.len(), "refreshed cache entry");
                DataResponse { records, outcome: Outcome::Fetched }
            }
            Err(err) => self.fail_over(key, &err),
        }
    }

    /// One bounded fetch attempt followed by extraction. The worker permit is
    /// held only for the network call.
    async fn fetch_and_extract(&self, query: &X::Query, max_items: usize) -> Result<Vec<X::Record>, Error> {
        let permit = Arc::clone(&self.workers)
            .acquire_owned()
            .await
            .map_err(|_| Error::Transport("worker pool closed".into()))?;

        let page = self.extractor.page(query);
        let fetched = self.fetcher.get_page(&page).await;
        drop(permit);

        self.extractor.extract(&fetched?, max_items)
    }

    /// Serve-stale-on-error, else static fallback. The existing entry is
    /// neither evicted nor overwritten by the failure.
    fn fail_over(&self, key: &str, err: &Error) -> DataResponse<X::Record> {
        if let Some(entry) = self.cache.get(key) {
            tracing::warn!(source = self.source_name(), key, error = %err, "refresh failed, serving stale cache");
            return DataResponse { records: entry.records.clone(), outcome: Outcome::Stale };
        }

        tracing::warn!(source = self.source_name(), key, error = %err, "refresh failed with no cache, serving fallback");
        DataResponse { records: self.extractor.fallback(), outcome: Outcome::Fallback }
    }

    /// Degraded path for a completely cold cache.
    ///
    /// Runs a capped refresh in a spawned task so that abandoning the wait
    /// does not cancel the fetch: a late completion still updates the cache
    /// via the store's last-write-wins put. A detached full-fidelity refresh
    /// is always scheduled, mirroring the capped fetch's finally-block in the
    /// policy this replaces.
    async fn first_request(&self, key: String, query: X::Query) -> DataResponse<X::Record> {
        let capped = DEGRADED_MAX_ITEMS.min(self.opts.max_items);
        let (tx, rx) = oneshot::channel();

        let service = self.clone();
        let task_key = key.clone();
        let task_query = query.clone();
        let capped_task = tokio::spawn(async move {
            let response = service.refresh(&task_key, &task_query, capped, false).await;
            let _ = tx.send(response);
        });
        self.track(capped_task).await;

        let waited = tokio::time::timeout(self.opts.first_request_deadline, rx).await;

        self.schedule_full_refresh(key.clone(), query).await;

        match waited {
            Ok(Ok(response)) => response,
            Ok(Err(_closed)) => {
                tracing::error!(source = self.source_name(), key, "first-request task dropped its result");
                DataResponse { records: self.extractor.fallback(), outcome: Outcome::Fallback }
            }
            Err(_elapsed) => {
                tracing::warn!(source = self.source_name(), key, "first-request deadline elapsed, returning partial data");
                let mut records = self.extractor.fallback();
                records.truncate(FALLBACK_PREVIEW_ITEMS);
                DataResponse { records, outcome: Outcome::Partial }
            }
        }
    }

    /// Detached full-fidelity refresh; forced so a capped entry written
    /// moments earlier is upgraded rather than mistaken for fresh data.
    async fn schedule_full_refresh(&self, key: String, query: X::Query) {
        let service = self.clone();
        let max_items = self.opts.max_items;
        let handle = tokio::spawn(async move {
            let _ = service.refresh(&key, &query, max_items, true).await;
        });
        self.track(handle).await;
    }

    async fn key_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.in_flight.lock().await;
        // a lock referenced only by the map has no holder or waiter
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(locks.entry(key.to_string()).or_default())
    }

    async fn track(&self, handle: JoinHandle<()>) {
        let mut handles = self.background.lock().await;
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
    }

    /// Number of background tasks scheduled and not yet reaped.
    pub async fn background_tasks(&self) -> usize {
        self.background.lock().await.len()
    }

    /// Await every tracked background task. Used by tests and by shutdown to
    /// drain work deterministically.
    pub async fn join_background(&self) {
        let handles: Vec<_> = { self.background.lock().await.drain(..).collect() };
        for handle in handles {
            let _ = handle.await;
        }
    }

    /// Abort tracked background tasks without waiting for them.
    pub async fn abort_background(&self) {
        for handle in self.background.lock().await.drain(..) {
            handle.abort();
        }
    }
}
