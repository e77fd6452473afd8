//! Error type shared by every fallible table operation.

use thiserror::Error;

/// Errors reported by [`ChainedHashTable`](crate::ChainedHashTable) and its cursors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TableError {
    /// Rejected construction or configuration parameter.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: &'static str },

    /// `at`/`at_mut` was asked for a key that is not stored.
    #[error("key not found")]
    KeyNotFound,

    /// A bucket-indexed operation received an index `>= bucket_count`.
    #[error("bucket index {index} out of range (bucket count {bucket_count})")]
    IndexOutOfRange { index: usize, bucket_count: usize },

    /// The cursor was drawn from another table, outlived a structural
    /// change, or does not designate an entry.
    #[error("cursor is not valid for this table")]
    InvalidCursor,
}
