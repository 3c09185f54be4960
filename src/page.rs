//! Pagination types: page specs and page results.
//!
//! A [`PageSpec`] is the composite identity of one listing page - index, size,
//! sort field, sort direction. It doubles as the page cache key: two requests
//! with the same spec hit the same cache entry. Explicit enums replace magic
//! sort strings so an invalid spec cannot be constructed.

use crate::book::Book;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sortable top-level fields of a book.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortField {
    Id,
    #[default]
    Title,
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortField::Id => write!(f, "id"),
            SortField::Title => write!(f, "title"),
        }
    }
}

/// Sort direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}

/// Identity of one listing page: (page index, page size, sort field, order).
///
/// `Eq + Hash` so it can key the page cache directly; `Display` renders the
/// composite cache key for logging, e.g. `pages:0:20:title:asc`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageSpec {
    /// Zero-based page index.
    pub page: usize,

    /// Books per page.
    pub size: usize,

    pub sort: SortField,
    pub order: SortOrder,
}

impl PageSpec {
    pub fn new(page: usize, size: usize) -> Self {
        PageSpec {
            page,
            size,
            sort: SortField::default(),
            order: SortOrder::default(),
        }
    }

    pub fn sorted_by(mut self, sort: SortField, order: SortOrder) -> Self {
        self.sort = sort;
        self.order = order;
        self
    }

    /// Offset of the first record on this page.
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }
}

impl fmt::Display for PageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pages:{}:{}:{}:{}",
            self.page, self.size, self.sort, self.order
        )
    }
}

/// One page of books plus total-count metadata.
///
/// Derived view of a record slice, never authoritative.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BookPage {
    pub items: Vec<Book>,

    /// Total record count across the whole collection.
    pub total: u64,

    /// Page index this result answers.
    pub page: usize,

    /// Requested page size (the last page may hold fewer items).
    pub size: usize,
}

impl BookPage {
    pub fn new(items: Vec<Book>, total: u64, spec: &PageSpec) -> Self {
        BookPage {
            items,
            total,
            page: spec.page,
            size: spec.size,
        }
    }

    /// Number of pages needed for `total` records at this page size.
    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.total.div_ceil(self.size as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_spec_display_composite_key() {
        let spec = PageSpec::new(2, 25).sorted_by(SortField::Id, SortOrder::Desc);
        assert_eq!(spec.to_string(), "pages:2:25:id:desc");
    }

    #[test]
    fn test_page_spec_defaults() {
        let spec = PageSpec::new(0, 20);
        assert_eq!(spec.sort, SortField::Title);
        assert_eq!(spec.order, SortOrder::Asc);
    }

    #[test]
    fn test_page_spec_offset() {
        assert_eq!(PageSpec::new(0, 20).offset(), 0);
        assert_eq!(PageSpec::new(3, 10).offset(), 30);
    }

    #[test]
    fn test_page_spec_hash_identity() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(PageSpec::new(0, 20));
        set.insert(PageSpec::new(0, 20));
        set.insert(PageSpec::new(1, 20));

        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_total_pages() {
        let spec = PageSpec::new(0, 10);
        let page = BookPage::new(vec![], 41, &spec);
        assert_eq!(page.total_pages(), 5);

        let exact = BookPage::new(vec![], 40, &spec);
        assert_eq!(exact.total_pages(), 4);
    }
}
