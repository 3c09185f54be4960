//! The three cache components fronting the book store.
//!
//! - [`BookCache`]: single records by id, invalidated per-id on writes.
//! - [`PageCache`]: listing pages by [`PageSpec`](crate::page::PageSpec),
//!   bounded + expiring, invalidated wholesale on any mutation.
//! - [`MetadataKeyCache`]: one global distinct-key set, maintained per the
//!   configured [`MetadataKeyPolicy`](crate::config::MetadataKeyPolicy).

pub mod book;
pub mod metadata;
pub mod page;

pub use book::BookCache;
pub use metadata::MetadataKeyCache;
pub use page::PageCache;
