//! Cursors: checked (bucket, position) handles into a `ChainedHashTable`.
//!
//! A `Cursor` is a plain `Copy` value. It does not borrow the table; every
//! access goes back through the table (`&` to read, `&mut` to write), so the
//! borrow checker rules out aliased mutation while the cursor itself can be
//! held across calls.
//!
//! Validity
//! - A cursor belongs to the table that produced it. Clones of that table
//!   are different tables.
//! - Insertion that does not grow the table keeps every cursor valid.
//! - Growth, an explicit rehash that changes the bucket count, any erase,
//!   `clear` and `take` invalidate all earlier cursors. Operations that hand
//!   back a cursor (`erase_at`, `remove_at`) return one that is valid
//!   afterwards.
//! - Erase invalidates more than it disturbs. Swap-with-last only moves the
//!   erased slot and the tail of its bucket, but the generation is
//!   table-wide, so cursors into untouched buckets are rejected as well.
//! - Using an invalid cursor yields `TableError::InvalidCursor`.

use crate::chained_hash_table::{ChainedHashTable, Entry};
use crate::error::TableError;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Walks the whole table, crossing bucket boundaries.
    Table,
    /// Stays in one bucket and stops at that bucket's end position.
    Bucket,
}

/// Position of an entry, or of an end marker, inside one table.
///
/// Equality compares the owning table and the (bucket, position) pair only,
/// so a bucket-local cursor and a table-wide cursor at the same slot are
/// equal.
#[derive(Debug, Clone, Copy)]
pub struct Cursor {
    table: u64,
    generation: u64,
    bucket: usize,
    pos: usize,
    scope: Scope,
}

impl PartialEq for Cursor {
    fn eq(&self, other: &Self) -> bool {
        self.table == other.table && self.bucket == other.bucket && self.pos == other.pos
    }
}

impl Eq for Cursor {}

impl Cursor {
    pub fn bucket(&self) -> usize {
        self.bucket
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// True for cursors from `bucket_begin`/`bucket_end` and their successors.
    pub fn is_bucket_local(&self) -> bool {
        self.scope == Scope::Bucket
    }

    pub fn key<'a, K, V, S>(
        &self,
        table: &'a ChainedHashTable<K, V, S>,
    ) -> Result<&'a K, TableError> {
        table.entry_at(*self).map(|e| &e.key)
    }

    pub fn value<'a, K, V, S>(
        &self,
        table: &'a ChainedHashTable<K, V, S>,
    ) -> Result<&'a V, TableError> {
        table.entry_at(*self).map(|e| &e.value)
    }

    pub fn entry<'a, K, V, S>(
        &self,
        table: &'a ChainedHashTable<K, V, S>,
    ) -> Result<(&'a K, &'a V), TableError> {
        table.entry_at(*self).map(|e| (&e.key, &e.value))
    }

    pub fn value_mut<'a, K, V, S>(
        &self,
        table: &'a mut ChainedHashTable<K, V, S>,
    ) -> Result<&'a mut V, TableError> {
        table.entry_at_mut(*self).map(|e| &mut e.value)
    }
}

impl<K, V, S> ChainedHashTable<K, V, S> {
    fn cursor(&self, bucket: usize, pos: usize, scope: Scope) -> Cursor {
        Cursor {
            table: self.id,
            generation: self.generation,
            bucket,
            pos,
            scope,
        }
    }

    /// First entry of the first non-empty bucket at or after `from`, or `end()`.
    fn first_occupied_from(&self, from: usize) -> Cursor {
        match (from..self.buckets.len()).find(|&b| !self.buckets[b].is_empty()) {
            Some(b) => self.cursor(b, 0, Scope::Table),
            None => self.end(),
        }
    }

    fn check_owned(&self, c: Cursor) -> Result<(), TableError> {
        if c.table != self.id || c.generation != self.generation {
            return Err(TableError::InvalidCursor);
        }
        Ok(())
    }

    /// Slot designated by `c`, if it designates an entry at all.
    fn checked_slot(&self, c: Cursor) -> Result<(usize, usize), TableError> {
        self.check_owned(c)?;
        match self.buckets.get(c.bucket) {
            Some(chain) if c.pos < chain.len() => Ok((c.bucket, c.pos)),
            _ => Err(TableError::InvalidCursor),
        }
    }

    pub(crate) fn entry_at(&self, c: Cursor) -> Result<&Entry<K, V>, TableError> {
        let (b, p) = self.checked_slot(c)?;
        Ok(&self.buckets[b][p])
    }

    pub(crate) fn entry_at_mut(&mut self, c: Cursor) -> Result<&mut Entry<K, V>, TableError> {
        let (b, p) = self.checked_slot(c)?;
        Ok(&mut self.buckets[b][p])
    }

    /// Cursor to the first entry in bucket-major order, or `end()` when empty.
    pub fn begin(&self) -> Cursor {
        self.first_occupied_from(0)
    }

    /// The canonical past-the-end cursor: `(bucket_count, 0)`.
    pub fn end(&self) -> Cursor {
        self.cursor(self.buckets.len(), 0, Scope::Table)
    }

    /// Bucket-local cursor to the first entry of bucket `n`. Equal to
    /// `bucket_end(n)` when the bucket is empty.
    pub fn bucket_begin(&self, n: usize) -> Result<Cursor, TableError> {
        self.check_bucket(n)?;
        Ok(self.cursor(n, 0, Scope::Bucket))
    }

    /// Bucket-local past-the-end cursor `(n, bucket_size(n))`.
    pub fn bucket_end(&self, n: usize) -> Result<Cursor, TableError> {
        self.check_bucket(n)?;
        Ok(self.cursor(n, self.buckets[n].len(), Scope::Bucket))
    }

    /// Successor of `c` within its scope.
    ///
    /// A table-wide cursor moves to the next entry of its bucket, then skips
    /// every empty bucket that follows; past the last entry it becomes
    /// `end()`. A bucket-local cursor stops at its bucket's end. End cursors
    /// advance to themselves.
    pub fn advance(&self, c: Cursor) -> Result<Cursor, TableError> {
        self.check_owned(c)?;
        match c.scope {
            Scope::Table => {
                if c.bucket >= self.buckets.len() {
                    return Ok(self.end());
                }
                let chain = &self.buckets[c.bucket];
                if c.pos >= chain.len() {
                    return Err(TableError::InvalidCursor);
                }
                if c.pos + 1 < chain.len() {
                    Ok(self.cursor(c.bucket, c.pos + 1, Scope::Table))
                } else {
                    Ok(self.first_occupied_from(c.bucket + 1))
                }
            }
            Scope::Bucket => {
                let chain = self
                    .buckets
                    .get(c.bucket)
                    .ok_or(TableError::InvalidCursor)?;
                Ok(self.cursor(c.bucket, (c.pos + 1).min(chain.len()), Scope::Bucket))
            }
        }
    }

    /// Removes the entry `c` designates and returns it with a cursor to the
    /// next logical entry: the entry swapped into the vacated slot if there
    /// was one, otherwise the next occupied bucket's first entry (or `end()`).
    /// Bucket-local cursors continue at their bucket's end instead.
    pub fn remove_at(&mut self, c: Cursor) -> Result<(K, V, Cursor), TableError> {
        let (b, p) = self.checked_slot(c)?;
        let entry = self.take_slot(b, p);
        let next = if p < self.buckets[b].len() {
            self.cursor(b, p, c.scope)
        } else {
            match c.scope {
                Scope::Table => self.first_occupied_from(b + 1),
                Scope::Bucket => self.cursor(b, p, Scope::Bucket),
            }
        };
        Ok((entry.key, entry.value, next))
    }

    /// [`remove_at`](Self::remove_at) without the removed pair.
    pub fn erase_at(&mut self, c: Cursor) -> Result<Cursor, TableError> {
        self.remove_at(c).map(|(_, _, next)| next)
    }
}

impl<K, V, S> ChainedHashTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Cursor to the entry for `q`, or `end()`. Never inserts.
    pub fn find<Q>(&self, q: &Q) -> Cursor
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter("find");
        let hash = self.make_hash(q);
        match self.locate(hash, q) {
            Some((b, p)) => self.cursor(b, p, Scope::Table),
            None => self.end(),
        }
    }
}
