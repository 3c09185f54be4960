//! The book service: store orchestration and cache maintenance.
//!
//! The only component with business logic. Every read consults its cache
//! first; every write goes to the store and, only once the store confirmed
//! it, applies the [`WritePlan`](crate::invalidation::WritePlan) for that
//! operation. A failed store call therefore leaves every cache exactly as it
//! was.

use crate::book::{Book, NewBook};
use crate::cache::{BookCache, MetadataKeyCache, PageCache};
use crate::config::CacheConfig;
use crate::error::{Error, Result};
use crate::invalidation::{KeyCacheAction, WriteOp, WritePlan};
use crate::observability::{CacheMetrics, NoOpMetrics};
use crate::page::{BookPage, PageSpec};
use crate::store::BookStore;
use std::collections::HashSet;
use std::sync::Arc;

struct Inner<S: BookStore> {
    store: S,
    books: BookCache,
    pages: PageCache,
    metadata_keys: MetadataKeyCache,
    config: CacheConfig,
    metrics: Arc<dyn CacheMetrics>,
}

/// Cache-fronted book service.
///
/// Cheap to clone (a single `Arc` increment) for sharing across request
/// workers. The caches are owned components created with the service - no
/// ambient singletons - so tests can build isolated instances with their own
/// stores and configs.
///
/// # Example
///
/// ```
/// use bookshelf::{BookService, CacheConfig, NewBook};
/// use bookshelf::store::InMemoryStore;
/// use serde_json::json;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let service = BookService::new(InMemoryStore::new(), CacheConfig::default())?;
///
/// let book = service
///     .add_book(NewBook::new("Solaris").with_metadata("genre", json!("sf")))
///     .await?;
/// let fetched = service.find_by_id(&book.id).await?;
/// assert_eq!(fetched.title, "Solaris");
/// # Ok(())
/// # }
/// ```
pub struct BookService<S: BookStore> {
    inner: Arc<Inner<S>>,
}

impl<S: BookStore> Clone for BookService<S> {
    fn clone(&self) -> Self {
        BookService {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: BookStore> BookService<S> {
    /// Create a service over `store` with the given cache configuration.
    ///
    /// # Errors
    /// Returns `Error::Config` if the configuration is invalid.
    pub fn new(store: S, config: CacheConfig) -> Result<Self> {
        Self::with_metrics(store, config, Arc::new(NoOpMetrics))
    }

    /// Create a service with a custom metrics sink.
    ///
    /// # Errors
    /// Returns `Error::Config` if the configuration is invalid.
    pub fn with_metrics(
        store: S,
        config: CacheConfig,
        metrics: Arc<dyn CacheMetrics>,
    ) -> Result<Self> {
        config.validate()?;

        info!(
            "Book service starting (page capacity {}, page ttl {:?}, key policy {})",
            config.page_capacity, config.page_ttl, config.key_policy
        );

        Ok(BookService {
            inner: Arc::new(Inner {
                books: BookCache::new(),
                pages: PageCache::new(config.page_capacity, config.page_ttl),
                metadata_keys: MetadataKeyCache::new(),
                store,
                config,
                metrics,
            }),
        })
    }

    /// The backing store (for advanced use).
    pub fn store(&self) -> &S {
        &self.inner.store
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Persist a new book and maintain the caches.
    ///
    /// Returns the persisted record including its assigned id.
    ///
    /// # Errors
    /// Returns `Error::Store` if the insert fails; no cache is touched then.
    pub async fn add_book(&self, draft: NewBook) -> Result<Book> {
        let keys = draft.metadata_keys();
        let book = self.inner.store.insert(draft).await?;
        info!("✓ Added book {}", book.id);

        self.apply_plan(WritePlan::for_op(
            WriteOp::Create {
                metadata_keys: keys,
            },
            self.inner.config.key_policy,
        ))
        .await;

        Ok(book)
    }

    /// Overwrite the title and metadata of an existing book (full replace).
    ///
    /// # Errors
    /// - `Error::NotFound` if no book has this id (nothing written, no cache
    ///   touched).
    /// - `Error::Store` if the store fails; no cache is touched then.
    pub async fn update_book(&self, id: &str, draft: NewBook) -> Result<Book> {
        let mut book = self
            .inner
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(id))?;

        book.title = draft.title;
        book.metadata = draft.metadata;

        let book = self.inner.store.save(book).await?;
        info!("✓ Updated book {}", book.id);

        self.apply_plan(WritePlan::for_op(
            WriteOp::Update {
                id: book.id.clone(),
                metadata_keys: book.metadata_keys(),
            },
            self.inner.config.key_policy,
        ))
        .await;

        Ok(book)
    }

    /// Delete a book and maintain the caches.
    ///
    /// Under the merge-on-write key policy the metadata key cache is
    /// deliberately NOT corrected; see
    /// [`MetadataKeyPolicy`](crate::config::MetadataKeyPolicy).
    ///
    /// # Errors
    /// - `Error::NotFound` if no book has this id.
    /// - `Error::Store` if the store fails; no cache is touched then.
    pub async fn delete_book(&self, id: &str) -> Result<()> {
        if !self.inner.store.exists_by_id(id).await? {
            return Err(Error::not_found(id));
        }

        self.inner.store.delete_by_id(id).await?;
        info!("✓ Deleted book {}", id);

        self.apply_plan(WritePlan::for_op(
            WriteOp::Delete { id: id.to_string() },
            self.inner.config.key_policy,
        ))
        .await;

        Ok(())
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Fetch one book, read-through the record cache.
    ///
    /// # Errors
    /// - `Error::NotFound` if no book has this id (nothing is cached).
    /// - `Error::Store` if the store fails on a miss.
    pub async fn find_by_id(&self, id: &str) -> Result<Book> {
        if let Some(book) = self.inner.books.get(id) {
            self.inner.metrics.record_hit("book", id);
            return Ok(book);
        }
        self.inner.metrics.record_miss("book", id);

        let book = self
            .inner
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(id))?;

        self.inner.books.put(book.clone());
        Ok(book)
    }

    /// Fetch every book, uncached (legacy full scan).
    ///
    /// # Errors
    /// Returns `Error::Store` if the store fails.
    pub async fn list_all(&self) -> Result<Vec<Book>> {
        self.inner.store.find_all().await
    }

    /// Fetch one listing page, read-through the page cache.
    ///
    /// # Errors
    /// Returns `Error::Store` if the store fails on a miss.
    pub async fn list_page(&self, spec: PageSpec) -> Result<BookPage> {
        if let Some(page) = self.inner.pages.get(&spec) {
            self.inner.metrics.record_hit("pages", &spec.to_string());
            return Ok(page);
        }
        self.inner.metrics.record_miss("pages", &spec.to_string());

        let (items, total) = self.inner.store.find_page(&spec).await?;
        let page = BookPage::new(items, total, &spec);

        for evicted in self.inner.pages.put(spec, page.clone()) {
            self.inner.metrics.record_eviction("pages", &evicted.to_string());
        }
        Ok(page)
    }

    /// The distinct metadata keys across all books, read-through the key
    /// cache.
    ///
    /// On a cold cache the store aggregation runs outside the entry lock;
    /// the result is then installed unless a concurrent request got there
    /// first.
    ///
    /// # Errors
    /// Returns `Error::Store` if the aggregation fails on a miss.
    pub async fn metadata_keys(&self) -> Result<HashSet<String>> {
        if let Some(keys) = self.inner.metadata_keys.get().await {
            self.inner.metrics.record_hit("metadata_keys", "*");
            return Ok(keys);
        }
        self.inner.metrics.record_miss("metadata_keys", "*");

        let keys = self.inner.store.distinct_metadata_keys().await?;
        Ok(self.inner.metadata_keys.populate_if_absent(keys).await)
    }

    /// Warm the metadata key cache at startup.
    ///
    /// Logs and swallows failures so a cold or unreachable store never aborts
    /// startup; the next read simply recomputes.
    pub async fn warm(&self) {
        info!("🚀 Starting metadata cache warmup...");

        match self.metadata_keys().await {
            Ok(keys) => {
                info!("Metadata cache warmup complete. Cached {} unique keys.", keys.len());
            }
            Err(e) => {
                error!("Failed to warm metadata cache: {}", e);
            }
        }
    }

    // ------------------------------------------------------------------
    // Cache maintenance
    // ------------------------------------------------------------------

    /// Apply one write's cache maintenance plan.
    ///
    /// Called only after the store confirmed the write.
    async fn apply_plan(&self, plan: WritePlan) {
        if let Some(id) = &plan.evict_book {
            self.inner.books.invalidate(id);
            self.inner.metrics.record_invalidation("book", id);
        }

        if plan.evict_pages {
            self.inner.pages.invalidate_all();
            self.inner.metrics.record_invalidation("pages", "*");
        }

        match plan.key_action {
            KeyCacheAction::Keep => {}
            KeyCacheAction::InvalidateAll => {
                self.inner.metadata_keys.invalidate().await;
                self.inner.metrics.record_invalidation("metadata_keys", "*");
            }
            KeyCacheAction::Merge(keys) => {
                self.inner.metadata_keys.merge(keys).await;
            }
        }
    }
}
