//! Error types for the book service core.

use std::fmt;

/// Result type for service and store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the book service core.
///
/// All fallible operations return `Result<T>` where `Result` is defined as
/// `std::result::Result<T, Error>`.
#[derive(Debug, Clone)]
pub enum Error {
    /// No book exists with the given id.
    ///
    /// Raised by read/update/delete-by-id operations. This is a distinct,
    /// catchable condition carrying the offending id - callers map it to a
    /// "missing resource" response rather than a generic failure.
    NotFound {
        /// The id that was looked up.
        id: String,
    },

    /// The backing store failed.
    ///
    /// Common causes:
    /// - Database connection lost
    /// - Query timeout
    /// - Aggregation failure
    ///
    /// The cache layer never masks these: a failed write propagates as-is and
    /// performs no cache invalidation or merge.
    Store(String),

    /// Invalid configuration at service construction.
    ///
    /// Common causes:
    /// - Zero page cache capacity
    /// - Zero page cache expiry
    ///
    /// **Recovery:** Fix configuration and restart.
    Config(String),

    /// Generic error with custom message.
    ///
    /// Used for errors that don't fit into other variants.
    Other(String),
}

impl Error {
    /// Shorthand for `Error::NotFound` carrying the offending id.
    pub fn not_found(id: impl Into<String>) -> Self {
        Error::NotFound { id: id.into() }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotFound { id } => write!(f, "Book not found with id: {}", id),
            Error::Store(msg) => write!(f, "Store error: {}", msg),
            Error::Config(msg) => write!(f, "Config error: {}", msg),
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ============================================================================
// Conversions from other error types
// ============================================================================

impl From<String> for Error {
    fn from(e: String) -> Self {
        Error::Other(e)
    }
}

impl From<&str> for Error {
    fn from(e: &str) -> Self {
        Error::Other(e.to_string())
    }
}
