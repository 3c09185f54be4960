//! The operation → caches table.
//!
//! Maps each confirmed write to the cache maintenance it requires, as an
//! explicit pure function instead of implicit cross-cutting metadata. The
//! service computes a [`WritePlan`] from the [`WriteOp`] and the configured
//! [`MetadataKeyPolicy`], then applies it - never before the store confirmed
//! the write.
//!
//! | op     | book cache      | page cache | key cache (invalidate-on-write) | key cache (merge-on-write) |
//! |--------|-----------------|------------|---------------------------------|----------------------------|
//! | create | -               | evict all  | invalidate                      | merge written keys         |
//! | update | evict id        | evict all  | invalidate                      | merge written keys         |
//! | delete | evict id        | evict all  | invalidate                      | keep (documented blind spot) |

use crate::config::MetadataKeyPolicy;
use std::collections::HashSet;

/// A confirmed mutation, carrying what the cache layer needs to know about it.
#[derive(Clone, Debug)]
pub enum WriteOp {
    Create {
        /// Metadata keys on the record just written.
        metadata_keys: HashSet<String>,
    },
    Update {
        id: String,
        metadata_keys: HashSet<String>,
    },
    Delete {
        id: String,
    },
}

/// What to do to the metadata key cache after a write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyCacheAction {
    /// Leave the cached set alone.
    Keep,

    /// Drop the cached set; the next read recomputes.
    InvalidateAll,

    /// Union these keys into the resident set.
    Merge(HashSet<String>),
}

/// The cache maintenance one write requires.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WritePlan {
    /// Book cache entry to evict, if any.
    pub evict_book: Option<String>,

    /// Whether the page cache is dropped wholesale.
    pub evict_pages: bool,

    pub key_action: KeyCacheAction,
}

impl WritePlan {
    /// Compute the plan for one write under the given key-cache policy.
    pub fn for_op(op: WriteOp, policy: MetadataKeyPolicy) -> Self {
        let (evict_book, written_keys) = match op {
            WriteOp::Create { metadata_keys } => (None, Some(metadata_keys)),
            WriteOp::Update { id, metadata_keys } => (Some(id), Some(metadata_keys)),
            WriteOp::Delete { id } => (Some(id), None),
        };

        let key_action = match (policy, written_keys) {
            (MetadataKeyPolicy::InvalidateOnWrite, _) => KeyCacheAction::InvalidateAll,
            (MetadataKeyPolicy::MergeOnWrite, Some(keys)) => KeyCacheAction::Merge(keys),
            // Delete under merge-on-write: the one-way ratchet. The cached
            // set may keep keys no record carries anymore.
            (MetadataKeyPolicy::MergeOnWrite, None) => KeyCacheAction::Keep,
        };

        WritePlan {
            evict_book,
            // Every mutation can reshuffle any page, so all of them go.
            evict_pages: true,
            key_action,
        }
    }
}
