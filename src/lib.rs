//! # bookshelf
//!
//! Cache-fronted CRUD core for a book tracking service.
//!
//! Books (a title plus free-form metadata) live in a durable store reached
//! through the [`BookStore`](store::BookStore) trait. In front of the two hot
//! queries - paginated listing and the distinct-metadata-key set - and the
//! per-id lookup sit three in-process caches:
//!
//! - **Record cache** ([`cache::BookCache`]): books by id, no expiry,
//!   invalidated per-id on writes.
//! - **Page cache** ([`cache::PageCache`]): listing pages by
//!   [`PageSpec`](page::PageSpec), bounded LRU with expiry from last access,
//!   invalidated wholesale on any mutation.
//! - **Metadata key cache** ([`cache::MetadataKeyCache`]): one global key
//!   set, maintained per the configured
//!   [`MetadataKeyPolicy`](config::MetadataKeyPolicy) - either dropped on
//!   every write, or incrementally merged with a documented delete blind
//!   spot.
//!
//! [`BookService`](service::BookService) is the orchestrator: it consults the
//! caches, delegates to the store, and applies the explicit
//! operation-to-caches table in [`invalidation`] after each confirmed write.
//!
//! ## Quick start
//!
//! ```
//! use bookshelf::{BookService, CacheConfig, NewBook, PageSpec};
//! use bookshelf::store::InMemoryStore;
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = BookService::new(InMemoryStore::new(), CacheConfig::default())?;
//! service.warm().await;
//!
//! let book = service
//!     .add_book(NewBook::new("Solaris").with_metadata("genre", json!("sf")))
//!     .await?;
//!
//! let page = service.list_page(PageSpec::new(0, 20)).await?;
//! assert_eq!(page.total, 1);
//!
//! let keys = service.metadata_keys().await?;
//! assert!(keys.contains("genre"));
//! # let _ = book;
//! # Ok(())
//! # }
//! ```
//!
//! The service is `Clone` (one `Arc` increment) for sharing across request
//! workers; all cache state is safe for concurrent access and no cache lock
//! is ever held across a store call.

#[macro_use]
extern crate log;

pub mod book;
pub mod cache;
pub mod config;
pub mod error;
pub mod invalidation;
pub mod observability;
pub mod page;
pub mod service;
pub mod store;

// Re-exports for convenience
pub use book::{Book, NewBook};
pub use config::{CacheConfig, MetadataKeyPolicy};
pub use error::{Error, Result};
pub use page::{BookPage, PageSpec, SortField, SortOrder};
pub use service::BookService;
pub use store::BookStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
