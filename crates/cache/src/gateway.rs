use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use common::{OrderId, ProductId};
use serde::{Serialize, de::DeserializeOwned};

use crate::{Result, keys};

/// Entry lifetime used when nothing else is configured.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// A key/value cache holding JSON-encoded responses.
#[async_trait]
pub trait CacheGateway: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;

    /// Removes every key starting with `prefix`. Returns how many were removed.
    async fn delete_prefix(&self, prefix: &str) -> Result<u64>;
}

/// A cache entry (or family of entries) made stale by a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
    Key(String),
    Prefix(String),
}

impl Invalidation {
    pub fn order(id: OrderId) -> Self {
        Self::Key(keys::order(id))
    }

    pub fn order_pages() -> Self {
        Self::Prefix(keys::ORDER_PAGES.to_owned())
    }

    pub fn product(id: ProductId) -> Self {
        Self::Key(keys::product(id))
    }

    pub fn product_pages() -> Self {
        Self::Prefix(keys::PRODUCT_PAGES.to_owned())
    }
}

/// Applies every invalidation, best effort.
///
/// Failures are logged and counted; they never reach the caller and are not
/// retried. Entries left behind expire with their TTL.
pub async fn invalidate(cache: &dyn CacheGateway, invalidations: &[Invalidation]) {
    for invalidation in invalidations {
        let outcome = match invalidation {
            Invalidation::Key(key) => cache.delete(key).await,
            Invalidation::Prefix(prefix) => cache.delete_prefix(prefix).await.map(|_| ()),
        };
        if let Err(e) = outcome {
            metrics::counter!("cache_invalidation_failures_total").increment(1);
            tracing::warn!(?invalidation, error = %e, "Cache invalidation failed");
        }
    }
}

/// Cache-aside read: returns the cached value for `key` when present,
/// otherwise runs `load` and stores its result for `ttl`.
///
/// Cache errors degrade to a miss; only errors from `load` are returned.
pub async fn read_through<T, E, F, Fut>(
    cache: &dyn CacheGateway,
    key: &str,
    ttl: Duration,
    load: F,
) -> std::result::Result<T, E>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    match cache.get(key).await {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => {
                metrics::counter!("cache_hits_total").increment(1);
                return Ok(value);
            }
            Err(e) => tracing::warn!(key, error = %e, "Discarding undecodable cache entry"),
        },
        Ok(None) => {}
        Err(e) => tracing::warn!(key, error = %e, "Cache read failed"),
    }
    metrics::counter!("cache_misses_total").increment(1);

    let value = load().await?;

    match serde_json::to_string(&value) {
        Ok(raw) => {
            if let Err(e) = cache.set(key, raw, ttl).await {
                tracing::warn!(key, error = %e, "Cache write failed");
            }
        }
        Err(e) => tracing::warn!(key, error = %e, "Could not encode value for cache"),
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::InMemoryCache;

    #[tokio::test]
    async fn second_read_is_served_from_cache() {
        let cache = InMemoryCache::new();
        let loads = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let loads = Arc::clone(&loads);
            let value: std::result::Result<Vec<i64>, ()> =
                read_through(&cache, "orders:1", DEFAULT_TTL, || async move {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Ok(vec![1, 2, 3])
                })
                .await;
            assert_eq!(value.unwrap(), vec![1, 2, 3]);
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn load_errors_are_not_cached() {
        let cache = InMemoryCache::new();

        let value: std::result::Result<i64, &str> =
            read_through(&cache, "orders:1", DEFAULT_TTL, || async { Err("boom") }).await;
        assert_eq!(value, Err("boom"));
        assert!(!cache.contains("orders:1").await);
    }

    #[tokio::test]
    async fn unavailable_cache_falls_back_to_loader() {
        let cache = InMemoryCache::new();
        cache.set_failing(true);

        let value: std::result::Result<i64, ()> =
            read_through(&cache, "orders:1", DEFAULT_TTL, || async { Ok(42) }).await;
        assert_eq!(value, Ok(42));
    }

    #[tokio::test]
    async fn invalidate_removes_keys_and_prefixes() {
        let cache = InMemoryCache::new();
        for key in ["orders:1", "orders:2", "orders:page=1:size=10"] {
            cache.set(key, "1".into(), DEFAULT_TTL).await.unwrap();
        }

        invalidate(
            &cache,
            &[
                Invalidation::order(OrderId::new(1)),
                Invalidation::order_pages(),
            ],
        )
        .await;

        assert!(!cache.contains("orders:1").await);
        assert!(cache.contains("orders:2").await);
        assert!(!cache.contains("orders:page=1:size=10").await);
    }

    #[tokio::test]
    async fn invalidate_swallows_backend_failures() {
        let cache = InMemoryCache::new();
        cache.set("orders:1", "1".into(), DEFAULT_TTL).await.unwrap();
        cache.set_failing(true);

        invalidate(&cache, &[Invalidation::order(OrderId::new(1))]).await;

        cache.set_failing(false);
        assert!(cache.contains("orders:1").await);
    }
}
