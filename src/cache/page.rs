//! Bounded page-result cache with expiry from last access.
//!
//! Caches [`BookPage`] results keyed by [`PageSpec`]. Two independent
//! lifetimes apply:
//! - a capacity bound: at most `capacity` distinct page specs resident, with
//!   least-recently-used eviction on insert beyond that;
//! - expiry from last access: entries untouched for longer than `ttl` count
//!   as misses and are dropped when seen.
//!
//! Listing pages are cheap to recompute, so any mutation invalidates the
//! whole cache ([`PageCache::invalidate_all`]) rather than hunting for the
//! affected specs.
//!
//! A single mutex guards the map and the recency state; every operation is a
//! short in-memory critical section with no await inside, and the capacity
//! bound holds at every instant.

use crate::page::{BookPage, PageSpec};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

struct PageEntry {
    page: BookPage,
    last_access: Instant,
}

impl PageEntry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.last_access.elapsed() > ttl
    }
}

/// Thread-safe bounded cache of listing pages.
pub struct PageCache {
    entries: Mutex<HashMap<PageSpec, PageEntry>>,
    capacity: usize,
    ttl: Duration,
}

impl PageCache {
    /// Create a page cache holding at most `capacity` specs, expiring entries
    /// `ttl` after their last access.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        PageCache {
            entries: Mutex::new(HashMap::with_capacity(capacity)),
            capacity,
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PageSpec, PageEntry>> {
        // A poisoned lock only means a panic mid-operation; the map itself
        // stays structurally sound, so keep serving.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Look up a cached page, refreshing its last-access time on hit.
    ///
    /// An expired entry is dropped and reported as a miss.
    pub fn get(&self, spec: &PageSpec) -> Option<BookPage> {
        let mut entries = self.lock();

        if let Some(entry) = entries.get_mut(spec) {
            if !entry.is_expired(self.ttl) {
                entry.last_access = Instant::now();
                debug!("✓ PageCache GET {} -> HIT", spec);
                return Some(entry.page.clone());
            }
            entries.remove(spec);
        }

        debug!("✓ PageCache GET {} -> MISS", spec);
        None
    }

    /// Store a page result, evicting the least-recently-used entry if the
    /// insert would exceed capacity.
    ///
    /// Returns the specs this insert pushed out, expired sweeps included, so
    /// callers can report them.
    pub fn put(&self, spec: PageSpec, page: BookPage) -> Vec<PageSpec> {
        if self.capacity == 0 {
            return Vec::new();
        }

        let mut entries = self.lock();
        let mut evicted = Vec::new();

        // Expired entries go first so they never crowd out live ones.
        let ttl = self.ttl;
        entries.retain(|spec, entry| {
            let live = !entry.is_expired(ttl);
            if !live {
                evicted.push(spec.clone());
            }
            live
        });

        while entries.len() >= self.capacity && !entries.contains_key(&spec) {
            let lru = entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_access)
                .map(|(spec, _)| spec.clone());
            match lru {
                Some(victim) => {
                    debug!("✓ PageCache EVICT {} (capacity {})", victim, self.capacity);
                    entries.remove(&victim);
                    evicted.push(victim);
                }
                None => break,
            }
        }

        debug!("✓ PageCache PUT {}", spec);
        entries.insert(
            spec,
            PageEntry {
                page,
                last_access: Instant::now(),
            },
        );

        evicted
    }

    /// Drop every cached page (wholesale invalidation on mutation).
    pub fn invalidate_all(&self) {
        self.lock().clear();
        debug!("✓ PageCache INVALIDATE_ALL");
    }

    /// Number of resident entries, expired ones included until swept.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::Book;
    use std::collections::HashMap as StdHashMap;

    fn page_for(spec: &PageSpec) -> BookPage {
        let book = Book {
            id: format!("id_{}", spec.page),
            title: format!("Title {}", spec.page),
            metadata: StdHashMap::new(),
        };
        BookPage::new(vec![book], 100, spec)
    }

    fn cache() -> PageCache {
        PageCache::new(5, Duration::from_secs(600))
    }

    #[test]
    fn test_put_get() {
        let cache = cache();
        let spec = PageSpec::new(0, 20);

        cache.put(spec.clone(), page_for(&spec));

        let hit = cache.get(&spec).expect("Expected cache hit");
        assert_eq!(hit.page, 0);
        assert_eq!(hit.total, 100);
    }

    #[test]
    fn test_miss() {
        let cache = cache();
        assert!(cache.get(&PageSpec::new(3, 20)).is_none());
    }

    #[test]
    fn test_invalidate_all() {
        let cache = cache();
        for i in 0..3 {
            let spec = PageSpec::new(i, 20);
            cache.put(spec.clone(), page_for(&spec));
        }
        assert_eq!(cache.len(), 3);

        cache.invalidate_all();

        assert!(cache.is_empty());
        assert!(cache.get(&PageSpec::new(0, 20)).is_none());
    }

    #[test]
    fn test_capacity_bound_holds() {
        let cache = cache();

        for i in 0..20 {
            let spec = PageSpec::new(i, 20);
            cache.put(spec.clone(), page_for(&spec));
            assert!(cache.len() <= 5, "len {} exceeds capacity", cache.len());
        }

        assert_eq!(cache.len(), 5);
    }

    #[test]
    fn test_lru_eviction_order() {
        let cache = cache();

        for i in 0..5 {
            let spec = PageSpec::new(i, 20);
            cache.put(spec.clone(), page_for(&spec));
        }

        // Touch page 0 so page 1 becomes the LRU victim.
        assert!(cache.get(&PageSpec::new(0, 20)).is_some());

        let spec = PageSpec::new(5, 20);
        cache.put(spec.clone(), page_for(&spec));

        assert!(cache.get(&PageSpec::new(0, 20)).is_some());
        assert!(cache.get(&PageSpec::new(1, 20)).is_none());
        assert!(cache.get(&PageSpec::new(5, 20)).is_some());
    }

    #[test]
    fn test_put_existing_spec_does_not_evict() {
        let cache = cache();

        for i in 0..5 {
            let spec = PageSpec::new(i, 20);
            cache.put(spec.clone(), page_for(&spec));
        }

        // Re-putting a resident spec replaces in place.
        let spec = PageSpec::new(2, 20);
        cache.put(spec.clone(), page_for(&spec));

        assert_eq!(cache.len(), 5);
        for i in 0..5 {
            assert!(cache.get(&PageSpec::new(i, 20)).is_some());
        }
    }

    #[test]
    fn test_put_reports_evicted_specs() {
        let cache = PageCache::new(1, Duration::from_secs(600));

        let first = PageSpec::new(0, 20);
        assert!(cache.put(first.clone(), page_for(&first)).is_empty());

        let second = PageSpec::new(1, 20);
        let evicted = cache.put(second.clone(), page_for(&second));
        assert_eq!(evicted, vec![first]);
    }

    #[test]
    fn test_expiry_from_last_access() {
        let cache = PageCache::new(5, Duration::from_millis(100));
        let spec = PageSpec::new(0, 20);
        cache.put(spec.clone(), page_for(&spec));

        assert!(cache.get(&spec).is_some());

        std::thread::sleep(Duration::from_millis(150));

        assert!(cache.get(&spec).is_none(), "Expired entry must be a miss");
    }

    #[test]
    fn test_access_refreshes_expiry() {
        let cache = PageCache::new(5, Duration::from_millis(300));
        let spec = PageSpec::new(0, 20);
        cache.put(spec.clone(), page_for(&spec));

        // Keep touching the entry; each access restarts the clock.
        for _ in 0..3 {
            std::thread::sleep(Duration::from_millis(100));
            assert!(cache.get(&spec).is_some(), "Touched entry must stay live");
        }
    }

    #[test]
    fn test_zero_capacity_caches_nothing() {
        let cache = PageCache::new(0, Duration::from_secs(600));
        let spec = PageSpec::new(0, 20);
        cache.put(spec.clone(), page_for(&spec));

        assert!(cache.get(&spec).is_none());
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_puts_respect_capacity() {
        use std::sync::Arc;

        let cache = Arc::new(PageCache::new(5, Duration::from_secs(600)));
        let mut handles = vec![];

        for i in 0..20 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                let spec = PageSpec::new(i, 20);
                cache.put(spec.clone(), page_for(&spec));
            }));
        }

        for handle in handles {
            handle.await.expect("Task failed");
        }

        assert!(cache.len() <= 5);
    }
}
