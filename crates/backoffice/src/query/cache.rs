//! Keyed query cache.
//!
//! Responses are cached per [`QueryKey`]. A cached entry younger than the
//! stale time is served without a request; anything older, or missing, is
//! fetched. Concurrent loads of the same key share one backend call.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::Instrument;

use super::key::{QueryKey, Resource};
use crate::api::Result;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long a response is served without refetching.
    pub stale_time: Duration,
    /// Entries untouched this long are evicted.
    pub idle_time: Duration,
    pub max_entries: u64,
    /// Automatic retries after a transient failure.
    pub retries: u32,
    pub retry_delay: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(30),
            idle_time: Duration::from_secs(300),
            max_entries: 500,
            retries: 1,
            retry_delay: Duration::from_millis(500),
        }
    }
}

#[derive(Clone)]
struct CacheEntry {
    value: Arc<dyn Any + Send + Sync>,
    fetched_at: Instant,
}

/// Shared query cache. Cheap to clone.
#[derive(Clone)]
pub struct QueryClient {
    cache: Cache<QueryKey, CacheEntry>,
    inflight: Arc<Mutex<HashMap<QueryKey, Arc<Mutex<()>>>>>,
    /// Bumped by every resource invalidation. A load that started under an
    /// older generation must not write its result back.
    generations: Arc<Mutex<HashMap<Resource, u64>>>,
    config: Arc<CacheConfig>,
}

impl QueryClient {
    pub fn new(config: CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_idle(config.idle_time)
            .build();
        Self {
            cache,
            inflight: Arc::new(Mutex::new(HashMap::new())),
            generations: Arc::new(Mutex::new(HashMap::new())),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns the cached value for `key` if fresh, otherwise calls `fetcher`.
    ///
    /// Transient failures are retried `config.retries` times. Failures are
    /// never cached.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(value) = self.fresh::<T>(&key).await {
            log::trace!("Cache hit for {}", key);
            return Ok(value);
        }

        let lock = self.key_lock(&key).await;
        let _guard = lock.lock().await;

        // A concurrent caller may have filled the entry while we waited.
        if let Some(value) = self.fresh::<T>(&key).await {
            log::trace!("Coalesced load for {}", key);
            self.release_key_lock(&key, &lock).await;
            return Ok(value);
        }

        let started_at = self.generation(key.resource).await;
        let span = tracing::debug_span!("cache_load", key = %key);
        let result = self.load_with_retry(&key, &fetcher).instrument(span).await;

        if let Ok(value) = &result {
            self.store_if_current(key.clone(), value.clone(), started_at)
                .await;
        }
        self.release_key_lock(&key, &lock).await;
        result
    }

    async fn load_with_retry<T, F, Fut>(&self, key: &QueryKey, fetcher: &F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match fetcher().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.config.retries && e.is_transient() => {
                    attempt += 1;
                    log::warn!(
                        "Load of {} failed ({}), retrying ({}/{})",
                        key,
                        e,
                        attempt,
                        self.config.retries
                    );
                    tokio::time::sleep(self.config.retry_delay).await;
                }
                Err(e) => {
                    log::debug!("Load of {} failed: {}", key, e);
                    return Err(e);
                }
            }
        }
    }

    async fn key_lock(&self, key: &QueryKey) -> Arc<Mutex<()>> {
        let mut inflight = self.inflight.lock().await;
        Arc::clone(
            inflight
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    /// Drops the per-key lock once nobody else is waiting on it.
    async fn release_key_lock(&self, key: &QueryKey, lock: &Arc<Mutex<()>>) {
        let mut inflight = self.inflight.lock().await;
        if Arc::strong_count(lock) <= 2 {
            inflight.remove(key);
        }
    }

    async fn fresh<T: Clone + 'static>(&self, key: &QueryKey) -> Option<T> {
        let entry = self.cache.get(key).await?;
        if entry.fetched_at.elapsed() >= self.config.stale_time {
            return None;
        }
        entry.value.downcast_ref::<T>().cloned()
    }

    async fn store<T: Send + Sync + 'static>(&self, key: QueryKey, value: T) {
        let entry = CacheEntry {
            value: Arc::new(value),
            fetched_at: Instant::now(),
        };
        self.cache.insert(key, entry).await;
    }

    async fn generation(&self, resource: Resource) -> u64 {
        self.generations
            .lock()
            .await
            .get(&resource)
            .copied()
            .unwrap_or(0)
    }

    /// Stores `value` unless `key`'s resource was invalidated after `started_at`.
    async fn store_if_current<T: Send + Sync + 'static>(
        &self,
        key: QueryKey,
        value: T,
        started_at: u64,
    ) {
        let generations = self.generations.lock().await;
        let current = generations.get(&key.resource).copied().unwrap_or(0);
        if current != started_at {
            log::debug!("Discarding load of {} finished after invalidation", key);
            return;
        }
        self.store(key, value).await;
    }

    /// Cached value regardless of staleness.
    pub async fn get_query_data<T: Clone + 'static>(&self, key: &QueryKey) -> Option<T> {
        let entry = self.cache.get(key).await?;
        entry.value.downcast_ref::<T>().cloned()
    }

    /// Seeds an entry as freshly fetched.
    pub async fn set_query_data<T: Send + Sync + 'static>(&self, key: QueryKey, value: T) {
        log::trace!("Seeding cache entry {}", key);
        self.store(key, value).await;
    }

    pub async fn is_fresh(&self, key: &QueryKey) -> bool {
        match self.cache.get(key).await {
            Some(entry) => entry.fetched_at.elapsed() < self.config.stale_time,
            None => false,
        }
    }

    pub async fn invalidate(&self, key: &QueryKey) {
        self.cache.invalidate(key).await;
    }

    /// Drops every entry under `resource`. Returns how many were removed.
    pub async fn invalidate_resource(&self, resource: Resource) -> usize {
        let mut generations = self.generations.lock().await;
        *generations.entry(resource).or_insert(0) += 1;
        let keys: Vec<QueryKey> = self
            .cache
            .iter()
            .filter(|(k, _)| k.starts_with(resource))
            .map(|(k, _)| (*k).clone())
            .collect();
        for key in &keys {
            self.cache.invalidate(key).await;
        }
        log::debug!(
            "Invalidated {} cached {} queries",
            keys.len(),
            resource.as_str()
        );
        drop(generations);
        keys.len()
    }

    pub async fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }

    /// Entries currently cached for `resource`.
    pub fn keys_for(&self, resource: Resource) -> Vec<QueryKey> {
        self.cache
            .iter()
            .filter(|(k, _)| k.starts_with(resource))
            .map(|(k, _)| (*k).clone())
            .collect()
    }
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl std::fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClient")
            .field("entries", &self.cache.entry_count())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::models::QueryParams;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn key(page: u32) -> QueryKey {
        QueryKey::list(Resource::Jobs, QueryParams::paged(page, 10))
    }

    #[tokio::test]
    async fn test_fresh_entry_served_from_cache() {
        let client = QueryClient::default();
        let calls = AtomicUsize::new(0);
        let fetch = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ApiError>(vec![1, 2, 3])
        };
        assert_eq!(client.fetch(key(1), fetch).await.unwrap(), vec![1, 2, 3]);
        assert_eq!(client.fetch(key(1), fetch).await.unwrap(), vec![1, 2, 3]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        client.fetch(key(2), fetch).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_entry_refetched() {
        let client = QueryClient::new(CacheConfig {
            stale_time: Duration::from_secs(5),
            ..CacheConfig::default()
        });
        let calls = AtomicUsize::new(0);
        let fetch = || async {
            Ok::<_, ApiError>(calls.fetch_add(1, Ordering::SeqCst))
        };
        assert_eq!(client.fetch(key(1), fetch).await.unwrap(), 0);
        tokio::time::advance(Duration::from_secs(6)).await;
        assert!(!client.is_fresh(&key(1)).await);
        assert_eq!(client.fetch(key(1), fetch).await.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failure_retried_once() {
        let client = QueryClient::default();
        let calls = AtomicUsize::new(0);
        let result = client
            .fetch(key(1), || async {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n == 0 {
                    Err(ApiError::Timeout)
                } else {
                    Ok("ok")
                }
            })
            .await;
        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_one_retry() {
        let client = QueryClient::default();
        let calls = AtomicUsize::new(0);
        let result: Result<u32> = client
            .fetch(key(1), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ApiError::Unreachable("refused".to_string()))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(client.get_query_data::<u32>(&key(1)).await.is_none());
    }

    #[tokio::test]
    async fn test_application_failure_not_retried() {
        let client = QueryClient::default();
        let calls = AtomicUsize::new(0);
        let result: Result<u32> = client
            .fetch(key(1), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ApiError::application(None, "Failed to load jobs"))
            })
            .await;
        assert_eq!(result.unwrap_err().user_message(), "Failed to load jobs");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_loads_coalesce() {
        let client = QueryClient::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let load = |client: QueryClient, calls: Arc<AtomicUsize>| async move {
            client
                .fetch(key(1), || {
                    let calls = calls.clone();
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok::<_, ApiError>(7u32)
                    }
                })
                .await
        };
        let (a, b) = tokio::join!(
            load(client.clone(), calls.clone()),
            load(client.clone(), calls.clone())
        );
        assert_eq!(a.unwrap(), 7);
        assert_eq!(b.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_load_in_flight_during_invalidation_is_not_cached() {
        let client = QueryClient::default();
        let in_flight = tokio::spawn({
            let client = client.clone();
            async move {
                client
                    .fetch(key(1), || async {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok::<_, ApiError>("before-update")
                    })
                    .await
            }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        client.invalidate_resource(Resource::Jobs).await;

        // The caller that asked still gets its answer.
        assert_eq!(in_flight.await.unwrap().unwrap(), "before-update");
        assert!(client.get_query_data::<&str>(&key(1)).await.is_none());

        let next = client
            .fetch(key(1), || async { Ok::<_, ApiError>("after-update") })
            .await
            .unwrap();
        assert_eq!(next, "after-update");
    }

    #[tokio::test]
    async fn test_invalidation_leaves_other_resources_loading() {
        let client = QueryClient::default();
        let users = QueryKey::detail(Resource::Users, "u-1");
        let in_flight = tokio::spawn({
            let client = client.clone();
            let users = users.clone();
            async move {
                client
                    .fetch(users, || async {
                        tokio::time::sleep(Duration::from_millis(30)).await;
                        Ok::<_, ApiError>(1u32)
                    })
                    .await
            }
        });
        tokio::time::sleep(Duration::from_millis(5)).await;
        client.invalidate_resource(Resource::Jobs).await;
        in_flight.await.unwrap().unwrap();
        assert_eq!(client.get_query_data::<u32>(&users).await, Some(1));
    }

    #[tokio::test]
    async fn test_invalidate_resource_only_touches_prefix() {
        let client = QueryClient::default();
        client.set_query_data(key(1), 1u32).await;
        client.set_query_data(key(2), 2u32).await;
        client
            .set_query_data(QueryKey::detail(Resource::Users, "u-1"), 3u32)
            .await;
        client.cache.run_pending_tasks().await;

        assert_eq!(client.invalidate_resource(Resource::Jobs).await, 2);
        assert!(client.get_query_data::<u32>(&key(1)).await.is_none());
        assert_eq!(
            client
                .get_query_data::<u32>(&QueryKey::detail(Resource::Users, "u-1"))
                .await,
            Some(3)
        );
    }
}
