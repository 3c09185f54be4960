//! Store client trait for the durable book collection.
//!
//! The `BookStore` trait decouples the service core from any specific document
//! database. The original collection lives behind a CRUD-plus-aggregation
//! interface; implementations plug in MongoDB, SQL, or the in-memory store
//! provided here for tests and embedding.
//!
//! # Implementing BookStore
//!
//! Implement this trait for any storage backend. Return `Err(Error::Store)`
//! for connectivity issues, query timeouts, or aggregation failures - the
//! service propagates those unmasked and performs no cache maintenance for a
//! failed write.
//!
//! # Distinct-keys aggregation
//!
//! `distinct_metadata_keys` must behave like: for every record, for every
//! metadata key, add the key to a running set. Deduplicated, unordered. An
//! empty collection (or one where no record carries metadata) yields an empty
//! set - never an error, never an absent result.

use crate::book::{Book, NewBook};
use crate::error::{Error, Result};
use crate::page::{PageSpec, SortField, SortOrder};
use std::collections::HashSet;

/// Trait for durable book storage.
///
/// **IMPORTANT:** All methods take `&self` to allow concurrent access.
/// Implementations should use interior mutability (DashMap, RwLock) or an
/// external connection pool.
///
/// **ASYNC:** All methods are async and must be awaited.
#[allow(async_fn_in_trait)]
pub trait BookStore: Send + Sync {
    /// Insert a new book, assigning its id.
    ///
    /// # Errors
    /// Returns `Err` if the store is unavailable or the insert fails.
    async fn insert(&self, draft: NewBook) -> Result<Book>;

    /// Overwrite an existing book by id (full replace).
    ///
    /// # Errors
    /// Returns `Err` if the store is unavailable or the write fails.
    async fn save(&self, book: Book) -> Result<Book>;

    /// Fetch a book by id.
    ///
    /// # Returns
    /// - `Ok(Some(book))` - found
    /// - `Ok(None)` - not present (not an error)
    ///
    /// # Errors
    /// Returns `Err` if the store is unavailable.
    async fn find_by_id(&self, id: &str) -> Result<Option<Book>>;

    /// Check whether a book with this id exists.
    ///
    /// Default implementation fetches the record; override when the backend
    /// has a cheaper existence probe.
    ///
    /// # Errors
    /// Returns `Err` if the store is unavailable.
    async fn exists_by_id(&self, id: &str) -> Result<bool> {
        Ok(self.find_by_id(id).await?.is_some())
    }

    /// Delete a book by id. Deleting an absent id is a no-op.
    ///
    /// # Errors
    /// Returns `Err` if the store is unavailable.
    async fn delete_by_id(&self, id: &str) -> Result<()>;

    /// Fetch every book (legacy full scan, potentially large).
    ///
    /// # Errors
    /// Returns `Err` if the store is unavailable.
    async fn find_all(&self) -> Result<Vec<Book>>;

    /// Fetch one page of books plus the total record count.
    ///
    /// # Errors
    /// Returns `Err` if the store is unavailable.
    async fn find_page(&self, spec: &PageSpec) -> Result<(Vec<Book>, u64)>;

    /// Aggregate the distinct metadata keys across all records.
    ///
    /// # Errors
    /// Returns `Err` if the store is unavailable or the aggregation fails.
    async fn distinct_metadata_keys(&self) -> Result<HashSet<String>>;
}

// ============================================================================
// In-Memory Store
// ============================================================================

use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// In-memory `BookStore` for tests and embedding.
///
/// Thread-safe via DashMap; ids are UUID v7 so insertion order sorts
/// naturally under `SortField::Id`. The `fail_next` toggle lets tests assert
/// that a failed store call propagates uncached and triggers no cache
/// maintenance.
///
/// # Example
///
/// ```
/// use bookshelf::store::{BookStore, InMemoryStore};
/// use bookshelf::NewBook;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryStore::new();
/// let book = store.insert(NewBook::new("Solaris")).await?;
/// assert!(store.exists_by_id(&book.id).await?);
/// # Ok(())
/// # }
/// ```
pub struct InMemoryStore {
    books: DashMap<String, Book>,
    fail_next: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        InMemoryStore {
            books: DashMap::new(),
            fail_next: AtomicBool::new(false),
        }
    }

    /// Number of stored books.
    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Make the next store call fail with `Error::Store`.
    ///
    /// Test hook for asserting error propagation through the service.
    pub fn fail_next_call(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    fn check_failure(&self) -> Result<()> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(Error::Store("injected store failure".to_string()));
        }
        Ok(())
    }

    fn sorted_books(&self, sort: SortField, order: SortOrder) -> Vec<Book> {
        let mut books: Vec<Book> = self.books.iter().map(|e| e.value().clone()).collect();
        books.sort_by(|a, b| {
            let cmp = match sort {
                SortField::Id => a.id.cmp(&b.id),
                SortField::Title => a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)),
            };
            match order {
                SortOrder::Asc => cmp,
                SortOrder::Desc => cmp.reverse(),
            }
        });
        books
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BookStore for InMemoryStore {
    async fn insert(&self, draft: NewBook) -> Result<Book> {
        self.check_failure()?;

        let book = Book {
            id: uuid::Uuid::now_v7().to_string(),
            title: draft.title,
            metadata: draft.metadata,
        };
        self.books.insert(book.id.clone(), book.clone());
        debug!("✓ Store INSERT {}", book.id);
        Ok(book)
    }

    async fn save(&self, book: Book) -> Result<Book> {
        self.check_failure()?;

        self.books.insert(book.id.clone(), book.clone());
        debug!("✓ Store SAVE {}", book.id);
        Ok(book)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Book>> {
        self.check_failure()?;
        Ok(self.books.get(id).map(|e| e.value().clone()))
    }

    async fn exists_by_id(&self, id: &str) -> Result<bool> {
        self.check_failure()?;
        Ok(self.books.contains_key(id))
    }

    async fn delete_by_id(&self, id: &str) -> Result<()> {
        self.check_failure()?;
        self.books.remove(id);
        debug!("✓ Store DELETE {}", id);
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Book>> {
        self.check_failure()?;
        Ok(self.sorted_books(SortField::Id, SortOrder::Asc))
    }

    async fn find_page(&self, spec: &PageSpec) -> Result<(Vec<Book>, u64)> {
        self.check_failure()?;

        let books = self.sorted_books(spec.sort, spec.order);
        let total = books.len() as u64;
        let items: Vec<Book> = books
            .into_iter()
            .skip(spec.offset())
            .take(spec.size)
            .collect();
        Ok((items, total))
    }

    async fn distinct_metadata_keys(&self) -> Result<HashSet<String>> {
        self.check_failure()?;

        let mut keys = HashSet::new();
        for entry in self.books.iter() {
            keys.extend(entry.value().metadata.keys().cloned());
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_assigns_id() {
        let store = InMemoryStore::new();

        let book = store
            .insert(NewBook::new("Solaris"))
            .await
            .expect("Failed to insert");

        assert!(!book.id.is_empty());
        let fetched = store
            .find_by_id(&book.id)
            .await
            .expect("Failed to fetch")
            .expect("Book not found");
        assert_eq!(fetched.title, "Solaris");
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let store = InMemoryStore::new();

        let mut book = store
            .insert(NewBook::new("Solarsi"))
            .await
            .expect("Failed to insert");
        book.title = "Solaris".to_string();
        store.save(book.clone()).await.expect("Failed to save");

        let fetched = store
            .find_by_id(&book.id)
            .await
            .expect("Failed to fetch")
            .expect("Book not found");
        assert_eq!(fetched.title, "Solaris");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_absent_is_noop() {
        let store = InMemoryStore::new();
        store
            .delete_by_id("nonexistent")
            .await
            .expect("Delete should not error");
    }

    #[tokio::test]
    async fn test_find_page_sorted_by_title() {
        let store = InMemoryStore::new();
        for title in ["Charlie", "Alpha", "Bravo", "Delta"] {
            store
                .insert(NewBook::new(title))
                .await
                .expect("Failed to insert");
        }

        let spec = PageSpec::new(0, 2).sorted_by(SortField::Title, SortOrder::Asc);
        let (items, total) = store.find_page(&spec).await.expect("Failed to page");

        assert_eq!(total, 4);
        let titles: Vec<&str> = items.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Bravo"]);

        let spec = PageSpec::new(1, 2).sorted_by(SortField::Title, SortOrder::Asc);
        let (items, _) = store.find_page(&spec).await.expect("Failed to page");
        let titles: Vec<&str> = items.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Charlie", "Delta"]);
    }

    #[tokio::test]
    async fn test_find_page_desc_and_past_end() {
        let store = InMemoryStore::new();
        for title in ["Alpha", "Bravo"] {
            store
                .insert(NewBook::new(title))
                .await
                .expect("Failed to insert");
        }

        let spec = PageSpec::new(0, 10).sorted_by(SortField::Title, SortOrder::Desc);
        let (items, _) = store.find_page(&spec).await.expect("Failed to page");
        assert_eq!(items[0].title, "Bravo");

        let past_end = PageSpec::new(5, 10);
        let (items, total) = store.find_page(&past_end).await.expect("Failed to page");
        assert!(items.is_empty());
        assert_eq!(total, 2);
    }

    #[tokio::test]
    async fn test_distinct_metadata_keys_union() {
        let store = InMemoryStore::new();
        store
            .insert(NewBook::new("A").with_metadata("genre", json!("sf")))
            .await
            .expect("Failed to insert");
        store
            .insert(
                NewBook::new("B")
                    .with_metadata("genre", json!("fantasy"))
                    .with_metadata("year", json!(2020)),
            )
            .await
            .expect("Failed to insert");

        let keys = store
            .distinct_metadata_keys()
            .await
            .expect("Failed to aggregate");
        assert_eq!(keys, HashSet::from(["genre".to_string(), "year".to_string()]));
    }

    #[tokio::test]
    async fn test_distinct_metadata_keys_empty_store() {
        let store = InMemoryStore::new();
        let keys = store
            .distinct_metadata_keys()
            .await
            .expect("Failed to aggregate");
        assert!(keys.is_empty());
    }

    #[tokio::test]
    async fn test_distinct_metadata_keys_no_metadata() {
        let store = InMemoryStore::new();
        store
            .insert(NewBook::new("Bare"))
            .await
            .expect("Failed to insert");

        let keys = store
            .distinct_metadata_keys()
            .await
            .expect("Failed to aggregate");
        assert!(keys.is_empty());
    }

    #[tokio::test]
    async fn test_fail_next_call_fails_once() {
        let store = InMemoryStore::new();
        store.fail_next_call();

        let err = store.find_all().await.expect_err("Expected injected failure");
        assert!(matches!(err, Error::Store(_)));

        // Subsequent calls succeed again
        store.find_all().await.expect("Failed after recovery");
    }
}
