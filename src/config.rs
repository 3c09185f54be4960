//! Cache configuration.

use std::time::Duration;

/// Maximum distinct page specs resident in the page cache by default.
pub const DEFAULT_PAGE_CAPACITY: usize = 5;

/// Default page cache expiry from last access.
pub const DEFAULT_PAGE_TTL: Duration = Duration::from_secs(10 * 60);

/// Maintenance policy for the metadata key cache on writes.
///
/// Exactly one policy is active per service instance; the two are never
/// mixed. The choice is a product decision: pay a full re-aggregation after
/// every write, or accept that the cached set can overstate the true key set
/// after deletes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MetadataKeyPolicy {
    /// Any create/update/delete drops the cached set wholesale; the next read
    /// re-runs the store's distinct-keys aggregation. Always exact, pays the
    /// aggregation cost on the first read after every write.
    InvalidateOnWrite,

    /// Create/update union the written record's keys into the resident set in
    /// place; delete leaves the set alone. One-way ratchet: deleting the last
    /// record carrying a key does NOT shrink the cached set, so it can
    /// overstate the true distinct-key set indefinitely. Accepted staleness,
    /// not a bug.
    #[default]
    MergeOnWrite,
}

impl std::fmt::Display for MetadataKeyPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataKeyPolicy::InvalidateOnWrite => write!(f, "invalidate-on-write"),
            MetadataKeyPolicy::MergeOnWrite => write!(f, "merge-on-write"),
        }
    }
}

/// Configuration for the cache layer.
///
/// # Example
///
/// ```
/// use bookshelf::config::{CacheConfig, MetadataKeyPolicy};
/// use std::time::Duration;
///
/// let config = CacheConfig::default()
///     .with_page_capacity(8)
///     .with_page_ttl(Duration::from_secs(300))
///     .with_key_policy(MetadataKeyPolicy::InvalidateOnWrite);
/// assert_eq!(config.page_capacity, 8);
/// ```
#[derive(Clone, Debug)]
pub struct CacheConfig {
    /// Maximum distinct page specs resident at once.
    pub page_capacity: usize,

    /// Page entries untouched for this long count as misses.
    pub page_ttl: Duration,

    /// How the metadata key cache is maintained on writes.
    pub key_policy: MetadataKeyPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            page_capacity: DEFAULT_PAGE_CAPACITY,
            page_ttl: DEFAULT_PAGE_TTL,
            key_policy: MetadataKeyPolicy::default(),
        }
    }
}

impl CacheConfig {
    pub fn with_page_capacity(mut self, capacity: usize) -> Self {
        self.page_capacity = capacity;
        self
    }

    pub fn with_page_ttl(mut self, ttl: Duration) -> Self {
        self.page_ttl = ttl;
        self
    }

    pub fn with_key_policy(mut self, policy: MetadataKeyPolicy) -> Self {
        self.key_policy = policy;
        self
    }

    /// Reject configurations the cache layer cannot honor.
    pub(crate) fn validate(&self) -> crate::error::Result<()> {
        if self.page_capacity == 0 {
            return Err(crate::error::Error::Config(
                "page_capacity must be at least 1".to_string(),
            ));
        }
        if self.page_ttl.is_zero() {
            return Err(crate::error::Error::Config(
                "page_ttl must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
