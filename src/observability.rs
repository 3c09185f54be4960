//! Metrics hooks for cache behavior.
//!
//! Implement [`CacheMetrics`] to feed hit/miss/eviction counts into your
//! monitoring system:
//!
//! ```ignore
//! struct PrometheusMetrics;
//!
//! impl CacheMetrics for PrometheusMetrics {
//!     fn record_hit(&self, cache: &str, key: &str) {
//!         // counter!("cache_hits", "cache" => cache).inc();
//!     }
//!     // ... other methods
//! }
//!
//! let service = BookService::with_metrics(store, config, Arc::new(PrometheusMetrics))?;
//! ```
//!
//! Default behavior (if not overridden) logs via the `log` crate. The service
//! records every read-through outcome, every write-driven invalidation, and
//! every page the bounded page cache pushes out; `cache` names which of the
//! three caches was involved (`book`, `pages`, `metadata_keys`).

/// Trait for cache metrics collection.
pub trait CacheMetrics: Send + Sync {
    /// Record a cache hit.
    fn record_hit(&self, cache: &str, key: &str) {
        debug!("Cache HIT: {} {}", cache, key);
    }

    /// Record a cache miss.
    fn record_miss(&self, cache: &str, key: &str) {
        debug!("Cache MISS: {} {}", cache, key);
    }

    /// Record an entry pushed out by capacity pressure or expiry.
    fn record_eviction(&self, cache: &str, key: &str) {
        debug!("Cache EVICT: {} {}", cache, key);
    }

    /// Record a write-driven invalidation (per-key or wholesale).
    fn record_invalidation(&self, cache: &str, key: &str) {
        debug!("Cache INVALIDATE: {} {}", cache, key);
    }
}

/// Default metrics implementation (no-op).
#[derive(Clone, Default)]
pub struct NoOpMetrics;

impl CacheMetrics for NoOpMetrics {
    fn record_hit(&self, _cache: &str, _key: &str) {}
    fn record_miss(&self, _cache: &str, _key: &str) {}
    fn record_eviction(&self, _cache: &str, _key: &str) {}
    fn record_invalidation(&self, _cache: &str, _key: &str) {}
}
