//! chained-hashtable: a single-threaded hash table built on separate
//! chaining, with load-factor driven growth and checked cursors.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: an associative container with expected O(1) insert, lookup and
//!   erase whose storage layout, growth policy and traversal model are all
//!   explicit and observable.
//! - Pieces:
//!   - `ChainedHashTable<K, V, S>`: owns `Vec<Bucket>`, where a bucket is a
//!     `Vec` of entries stored by value. `hash % bucket_count` picks the
//!     bucket a key lives in.
//!   - `Cursor`: `Copy` (bucket, position) handle validated against the
//!     table's identity and structural generation on every use.
//!   - `Iter`/`IterMut`/`IntoIter` and friends: Rust iterators that walk the
//!     same bucket-major order as cursors.
//!
//! Storage and growth
//! - Each entry stores its precomputed `u64` hash. Rehashing re-files
//!   entries from the stored hash; `K: Hash` never runs after insertion.
//! - Before a new key is appended, the table checks whether the new
//!   `len / bucket_count` would exceed `max_load_factor`. If so it rebuilds
//!   with `max(2 * bucket_count, ceil(len / max_load_factor))` buckets.
//!   Overwriting an existing key never grows the table.
//! - Nothing shrinks automatically. An explicit `rehash(n)` may shrink, but
//!   never below the load-factor floor.
//!
//! Erase
//! - Removal is swap-with-last inside the bucket (`Vec::swap_remove`), so
//!   bucket order is not stable across erase.
//!
//! Cursor validity
//! - Insertion without growth leaves cursors valid. Growth, a rehash that
//!   changes the bucket count, any erase, `clear` and `take` bump the
//!   generation and invalidate earlier cursors; stale or foreign cursors
//!   report `TableError::InvalidCursor`.
//! - References returned by lookups borrow the table, so the borrow checker
//!   rejects any structural mutation while they are alive.
//!
//! Copy and move
//! - `Clone` is a deep copy with a fresh identity. `take()` moves storage,
//!   counts and settings out in O(1) and leaves the source with zero
//!   buckets and zero entries; the source remains usable.
//!
//! Reentrancy
//! - `K: Hash` and `K: Eq` run while chains are searched. In debug builds a
//!   guard panics if such code re-enters the same table. The table is
//!   `!Send`/`!Sync`; it is a single-threaded structure.

mod chained_hash_table;
mod chained_hash_table_proptest;
pub mod config;
mod cursor;
mod error;
pub mod iter;
mod reentrancy;

// Public surface
pub use chained_hash_table::ChainedHashTable;
pub use config::{TableConfig, DEFAULT_BUCKET_COUNT, DEFAULT_MAX_LOAD_FACTOR};
pub use cursor::Cursor;
pub use error::TableError;
pub use iter::{BucketIter, IntoIter, Iter, IterMut, Keys, Values, ValuesMut};
