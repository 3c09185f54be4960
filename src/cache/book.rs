//! Per-id record cache (thread-safe, no expiry).
//!
//! Uses DashMap for concurrent access with per-key sharding: operations on
//! different ids never contend, and an invalidate-then-get on the same id
//! observes the miss or the newer value, never the evicted one. Entries live
//! until explicitly invalidated - the record count is finite, so unbounded
//! growth is an accepted tradeoff here.

use crate::book::Book;
use dashmap::DashMap;

/// Thread-safe cache of single books keyed by id.
#[derive(Default)]
pub struct BookCache {
    entries: DashMap<String, Book>,
}

impl BookCache {
    pub fn new() -> Self {
        BookCache {
            entries: DashMap::new(),
        }
    }

    /// Look up a cached book by id.
    pub fn get(&self, id: &str) -> Option<Book> {
        let hit = self.entries.get(id).map(|e| e.value().clone());
        if hit.is_some() {
            debug!("✓ BookCache GET {} -> HIT", id);
        } else {
            debug!("✓ BookCache GET {} -> MISS", id);
        }
        hit
    }

    /// Store a book under its own id.
    pub fn put(&self, book: Book) {
        debug!("✓ BookCache PUT {}", book.id);
        self.entries.insert(book.id.clone(), book);
    }

    /// Drop the entry for one id, if present.
    pub fn invalidate(&self, id: &str) {
        self.entries.remove(id);
        debug!("✓ BookCache INVALIDATE {}", id);
    }

    /// Drop every entry (wholesale reset, e.g. after a bulk import).
    pub fn clear(&self) {
        self.entries.clear();
        debug!("✓ BookCache CLEAR");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
