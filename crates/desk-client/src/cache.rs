//! Keyed query cache with staleness windows, optimistic writes and polling.
//!
//! Entries are stored as `serde_json::Value` so one cache can hold every
//! resource type. Keys are hierarchical (`["clients", "list", "per_page=20"]`)
//! and invalidation works on prefixes, so a mutation on a client can drop
//! every cached client list at once with `invalidate(&["clients"].into())`.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::error::DeskApiError;

/// Hierarchical cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Extend the key by one segment.
    pub fn push(mut self, segment: impl Into<String>) -> Self {
        self.0.push(segment.into());
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl<const N: usize> From<[&str; N]> for QueryKey {
    fn from(segments: [&str; N]) -> Self {
        Self::new(segments)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

/// How long fetched data stays fresh, and whether it is refetched on a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    pub stale_time: Duration,
    pub refetch_interval: Option<Duration>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            stale_time: Duration::ZERO,
            refetch_interval: None,
        }
    }
}

impl QueryOptions {
    /// Paged lists: fresh for 30 seconds.
    pub fn lists() -> Self {
        Self {
            stale_time: Duration::from_secs(30),
            refetch_interval: None,
        }
    }

    /// Single records: fresh for a minute.
    pub fn detail() -> Self {
        Self {
            stale_time: Duration::from_secs(60),
            refetch_interval: None,
        }
    }

    /// Unread counter: short staleness, polled every 30 seconds.
    pub fn notifications() -> Self {
        Self {
            stale_time: Duration::from_secs(10),
            refetch_interval: Some(Duration::from_secs(30)),
        }
    }

    /// Dashboard totals: refreshed every five minutes.
    pub fn summary() -> Self {
        Self {
            stale_time: Duration::from_secs(60),
            refetch_interval: Some(Duration::from_secs(300)),
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    fetched_at: Instant,
}

/// Shared query cache. Cheap to clone; clones share entries.
#[derive(Debug, Clone, Default)]
pub struct QueryCache {
    entries: Arc<DashMap<QueryKey, Entry>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return cached data younger than `options.stale_time`, otherwise run
    /// `fetcher` and cache its result. Errors are not cached.
    pub async fn fetch<T, F, Fut>(
        &self,
        key: &QueryKey,
        options: QueryOptions,
        fetcher: F,
    ) -> Result<T, DeskApiError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, DeskApiError>>,
    {
        if let Some(value) = self.fresh(key, options.stale_time) {
            match serde_json::from_value(value) {
                Ok(hit) => {
                    tracing::trace!(%key, "query cache hit");
                    return Ok(hit);
                }
                Err(e) => {
                    tracing::debug!(%key, error = %e, "cached value has another shape, refetching");
                }
            }
        }
        let fetched = fetcher().await?;
        self.set_data(key, &fetched)?;
        Ok(fetched)
    }

    fn fresh(&self, key: &QueryKey, stale_time: Duration) -> Option<Value> {
        let entry = self.entries.get(key)?;
        (entry.fetched_at.elapsed() < stale_time).then(|| entry.value.clone())
    }

    /// Cached data regardless of age.
    pub fn get_data<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let value = self.entries.get(key)?.value.clone();
        serde_json::from_value(value).ok()
    }

    pub fn set_data<T: Serialize + ?Sized>(&self, key: &QueryKey, data: &T) -> Result<(), DeskApiError> {
        let value = serde_json::to_value(data).map_err(|source| DeskApiError::Serialization {
            endpoint: format!("cache {key}"),
            source,
        })?;
        self.entries.insert(
            key.clone(),
            Entry {
                value,
                fetched_at: Instant::now(),
            },
        );
        Ok(())
    }

    /// Whether `key` is missing or older than `stale_time`.
    pub fn is_stale(&self, key: &QueryKey, stale_time: Duration) -> bool {
        self.fresh(key, stale_time).is_none()
    }

    /// Drop every entry whose key starts with `prefix`. Returns how many went.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let doomed: Vec<QueryKey> = self
            .entries
            .iter()
            .filter(|e| e.key().starts_with(prefix))
            .map(|e| e.key().clone())
            .collect();
        doomed
            .iter()
            .filter(|k| self.entries.remove(*k).is_some())
            .count()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply `update` to the cached value now, before the server confirms.
    ///
    /// Returns a [`Rollback`] that puts the previous entry back if the
    /// mutation fails.
    pub fn optimistic_update<T, F>(&self, key: &QueryKey, update: F) -> Result<Rollback, DeskApiError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(Option<T>) -> T,
    {
        let previous = self.entries.get(key).map(|e| e.value().clone());
        let current = previous
            .as_ref()
            .and_then(|e| serde_json::from_value(e.value.clone()).ok());
        self.set_data(key, &update(current))?;
        Ok(Rollback {
            cache: self.clone(),
            key: key.clone(),
            previous,
        })
    }

    /// Refetch `key` every `interval` until the handle is stopped or dropped.
    ///
    /// Failed fetches keep the last good value. Must be called from within a
    /// tokio runtime.
    pub fn poll<T, F, Fut>(&self, key: QueryKey, interval: Duration, fetcher: F) -> PollHandle
    where
        T: Serialize + Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, DeskApiError>> + Send + 'static,
    {
        let cache = self.clone();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                match fetcher().await {
                    Ok(data) => {
                        if let Err(e) = cache.set_data(&key, &data) {
                            tracing::warn!(%key, error = %e, "poll result not cacheable");
                        }
                    }
                    Err(e) => tracing::warn!(%key, error = %e, "poll fetch failed"),
                }
            }
        });
        PollHandle { task }
    }
}

/// Restores the entry an optimistic update replaced.
#[derive(Debug)]
#[must_use = "dropping a Rollback keeps the optimistic value"]
pub struct Rollback {
    cache: QueryCache,
    key: QueryKey,
    previous: Option<Entry>,
}

impl Rollback {
    pub fn restore(self) {
        match self.previous {
            Some(entry) => {
                self.cache.entries.insert(self.key, entry);
            }
            None => {
                self.cache.entries.remove(&self.key);
            }
        }
    }
}

/// Background poller. Aborted on [`PollHandle::stop`] or drop.
#[derive(Debug)]
pub struct PollHandle {
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn stop(self) {
        self.task.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn fresh_entries_skip_the_fetcher() {
        let cache = QueryCache::new();
        let key = QueryKey::from(["clients", "detail", "12"]);
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let name: String = cache
                .fetch(&key, QueryOptions::detail(), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok("Al Noor".to_string())
                })
                .await
                .unwrap();
            assert_eq!(name, "Al Noor");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_stale_time_always_refetches() {
        let cache = QueryCache::new();
        let key = QueryKey::from(["tasks", "list"]);
        let calls = AtomicUsize::new(0);
        for _ in 0..2 {
            let _: u32 = cache
                .fetch(&key, QueryOptions::default(), || async {
                    Ok(calls.fetch_add(1, Ordering::SeqCst) as u32)
                })
                .await
                .unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.get_data::<u32>(&key), Some(1));
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cache = QueryCache::new();
        let key = QueryKey::from(["invoices", "summary"]);
        let result: Result<u32, _> = cache
            .fetch(&key, QueryOptions::summary(), || async {
                Err(DeskApiError::NotAuthenticated)
            })
            .await;
        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn invalidate_drops_by_prefix() {
        let cache = QueryCache::new();
        cache.set_data(&["clients", "list", "page=1"].into(), &1).unwrap();
        cache.set_data(&["clients", "list", "page=2"].into(), &2).unwrap();
        cache.set_data(&["clients", "detail", "12"].into(), &3).unwrap();
        cache.set_data(&["tasks", "list"].into(), &4).unwrap();

        assert_eq!(cache.invalidate(&["clients", "list"].into()), 2);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.invalidate(&["clients"].into()), 1);
        assert_eq!(cache.get_data::<i32>(&["tasks", "list"].into()), Some(4));
    }

    #[test]
    fn optimistic_update_rolls_back() {
        let cache = QueryCache::new();
        let key = QueryKey::from(["notifications", "unread-count"]);
        cache.set_data(&key, &5u64).unwrap();

        let rollback = cache
            .optimistic_update(&key, |n: Option<u64>| n.unwrap_or(0).saturating_sub(1))
            .unwrap();
        assert_eq!(cache.get_data::<u64>(&key), Some(4));

        rollback.restore();
        assert_eq!(cache.get_data::<u64>(&key), Some(5));
    }

    #[test]
    fn rollback_of_new_entry_removes_it() {
        let cache = QueryCache::new();
        let key = QueryKey::from(["tags"]);
        let rollback = cache
            .optimistic_update(&key, |_: Option<Vec<String>>| vec!["vip".to_string()])
            .unwrap();
        assert!(!cache.is_empty());
        rollback.restore();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn poll_refreshes_until_stopped() {
        let cache = QueryCache::new();
        let key = QueryKey::from(["notifications", "unread-count"]);
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        let handle = cache.poll(key.clone(), Duration::from_millis(20), move || {
            let counter = counter.clone();
            async move { Ok(counter.fetch_add(1, Ordering::SeqCst) as u64) }
        });

        tokio::time::sleep(Duration::from_millis(90)).await;
        assert!(handle.is_running());
        handle.stop();
        let seen = calls.load(Ordering::SeqCst);
        assert!(seen >= 2, "expected several polls, saw {seen}");
        assert!(cache.get_data::<u64>(&key).is_some());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(calls.load(Ordering::SeqCst) <= seen + 1);
    }
}
