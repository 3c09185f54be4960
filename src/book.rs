//! The book record and its input shape.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A tracked book: a title plus a free-form metadata mapping.
///
/// The id is assigned by the store on insert and is immutable thereafter.
/// Metadata values are arbitrary JSON; keys are unique and unordered.
///
/// # Example
///
/// ```
/// use bookshelf::NewBook;
/// use serde_json::json;
///
/// let draft = NewBook::new("Solaris").with_metadata("genre", json!("sf"));
/// assert_eq!(draft.title, "Solaris");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Store-assigned identifier.
    pub id: String,

    pub title: String,

    /// Open key/value metadata (genre, year, rating, ...).
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Book {
    /// The set of metadata keys on this record.
    ///
    /// Used by the service to feed the metadata key cache on writes.
    pub fn metadata_keys(&self) -> HashSet<String> {
        self.metadata.keys().cloned().collect()
    }
}

/// Input shape for creating or fully replacing a book.
///
/// Carries no id: on create the store assigns one, on update the caller names
/// the target. Applying a `NewBook` replaces title and the whole metadata
/// mapping - it never merges into existing metadata.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,

    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl NewBook {
    pub fn new(title: impl Into<String>) -> Self {
        NewBook {
            title: title.into(),
            metadata: HashMap::new(),
        }
    }

    /// Add a metadata entry (builder style).
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// The set of metadata keys on this draft.
    pub fn metadata_keys(&self) -> HashSet<String> {
        self.metadata.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metadata_keys() {
        let book = Book {
            id: "1".to_string(),
            title: "Solaris".to_string(),
            metadata: HashMap::from([
                ("genre".to_string(), json!("sf")),
                ("year".to_string(), json!(1961)),
            ]),
        };

        let keys = book.metadata_keys();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains("genre"));
        assert!(keys.contains("year"));
    }

    #[test]
    fn test_metadata_keys_empty() {
        let book = Book {
            id: "1".to_string(),
            title: "Untitled".to_string(),
            metadata: HashMap::new(),
        };

        assert!(book.metadata_keys().is_empty());
    }

    #[test]
    fn test_new_book_builder() {
        let draft = NewBook::new("Dune")
            .with_metadata("genre", json!("sf"))
            .with_metadata("year", json!(1965));

        assert_eq!(draft.title, "Dune");
        assert_eq!(draft.metadata.len(), 2);
        assert!(draft.metadata_keys().contains("year"));
    }

    #[test]
    fn test_book_serde_roundtrip() {
        let book = Book {
            id: "b_1".to_string(),
            title: "Dune".to_string(),
            metadata: HashMap::from([("genre".to_string(), json!("sf"))]),
        };

        let json = serde_json::to_string(&book).expect("Failed to serialize");
        let back: Book = serde_json::from_str(&json).expect("Failed to deserialize");
        assert_eq!(book, back);
    }
}
