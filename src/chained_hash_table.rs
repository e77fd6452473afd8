//! ChainedHashTable: separate-chaining storage, lookup, erase and growth.

use crate::config::{
    check_load_factor, TableConfig, DEFAULT_BUCKET_COUNT, DEFAULT_MAX_LOAD_FACTOR,
};
use crate::error::TableError;
use crate::reentrancy::DebugReentrancy;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::mem;
use core::ops::Index;
use core::sync::atomic::{AtomicU64, Ordering};
use hashbrown::hash_map::DefaultHashBuilder;
use log::{debug, trace};

#[derive(Debug, Clone)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) hash: u64,
}

/// One chain. Order is insertion order until an erase swaps the tail in.
pub(crate) type Bucket<K, V> = Vec<Entry<K, V>>;

static NEXT_TABLE_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_table_id() -> u64 {
    NEXT_TABLE_ID.fetch_add(1, Ordering::Relaxed)
}

fn empty_buckets<K, V>(count: usize) -> Vec<Bucket<K, V>> {
    (0..count).map(|_| Vec::new()).collect()
}

/// A hash table mapping unique keys to values, resolving collisions by
/// chaining entries inside per-bucket vectors.
///
/// The table grows by doubling its bucket count whenever an insertion would
/// push `len() / bucket_count()` above the configured maximum load factor.
/// It never shrinks on its own.
pub struct ChainedHashTable<K, V, S = DefaultHashBuilder> {
    hasher: S,
    pub(crate) buckets: Vec<Bucket<K, V>>,
    pub(crate) len: usize,
    max_load_factor: f32,
    // Identity and structural version checked by every cursor operation.
    pub(crate) id: u64,
    pub(crate) generation: u64,
    pub(crate) reentrancy: DebugReentrancy,
}

impl<K, V> ChainedHashTable<K, V>
where
    K: Eq + Hash,
{
    /// 32 buckets, maximum load factor 0.75.
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// Fails with `InvalidArgument` when `buckets` is 0.
    pub fn with_capacity(buckets: usize) -> Result<Self, TableError> {
        Self::with_config(TableConfig::new().with_initial_buckets(buckets))
    }

    /// Fails with `InvalidArgument` when `buckets` is 0 or `max_load_factor`
    /// is not strictly positive.
    pub fn with_capacity_and_load_factor(
        buckets: usize,
        max_load_factor: f32,
    ) -> Result<Self, TableError> {
        Self::with_config(
            TableConfig::new()
                .with_initial_buckets(buckets)
                .with_max_load_factor(max_load_factor),
        )
    }

    pub fn with_config(config: TableConfig) -> Result<Self, TableError> {
        Self::with_config_and_hasher(config, DefaultHashBuilder::default())
    }
}

impl<K, V> Default for ChainedHashTable<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> ChainedHashTable<K, V, S> {
    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Entries per bucket. A table emptied by [`take`](Self::take) has no
    /// buckets and reports 0.
    pub fn load_factor(&self) -> f32 {
        if self.buckets.is_empty() {
            return 0.0;
        }
        (self.len as f64 / self.buckets.len() as f64) as f32
    }

    pub fn max_load_factor(&self) -> f32 {
        self.max_load_factor
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    pub fn bucket_size(&self, n: usize) -> Result<usize, TableError> {
        self.check_bucket(n)?;
        Ok(self.buckets[n].len())
    }

    pub(crate) fn check_bucket(&self, n: usize) -> Result<(), TableError> {
        if n >= self.buckets.len() {
            return Err(TableError::IndexOutOfRange {
                index: n,
                bucket_count: self.buckets.len(),
            });
        }
        Ok(())
    }

    /// Removes every entry and frees their storage. The bucket count is kept.
    pub fn clear(&mut self) {
        let count = self.buckets.len();
        let old = mem::replace(&mut self.buckets, empty_buckets(count));
        self.len = 0;
        self.generation += 1;
        // Entries drop after the table is consistent again.
        drop(old);
    }

    /// Moves the whole table out in O(1), leaving `self` with no buckets and
    /// no entries. Cursors drawn from `self` before the call stay valid for
    /// the returned table.
    ///
    /// The emptied table remains usable: the next insertion allocates
    /// `DEFAULT_BUCKET_COUNT` buckets.
    pub fn take(&mut self) -> Self
    where
        S: Clone,
    {
        Self {
            hasher: self.hasher.clone(),
            buckets: mem::take(&mut self.buckets),
            len: mem::replace(&mut self.len, 0),
            max_load_factor: self.max_load_factor,
            id: mem::replace(&mut self.id, next_table_id()),
            generation: self.generation,
            reentrancy: DebugReentrancy::new(),
        }
    }

    /// Rebuilds the bucket array with at least `min_buckets` buckets, and
    /// never fewer than the load-factor floor `ceil(len / max_load_factor)`
    /// (or 1 for an empty table).
    ///
    /// A request below the floor is raised to the floor; if that equals the
    /// current bucket count nothing happens. An explicit request below the
    /// current count but above the floor shrinks the table. Stored hashes are
    /// reused, so no user `Hash` code runs.
    pub fn rehash(&mut self, min_buckets: usize) {
        let target = self.target_bucket_count(min_buckets, self.len);
        self.resize_buckets(target);
    }

    /// Grows the table so `len() + additional` entries fit without an
    /// automatic rehash.
    pub fn reserve(&mut self, additional: usize) {
        let wanted = self.len.saturating_add(additional);
        let target = self.target_bucket_count(self.buckets.len(), wanted);
        if target > self.buckets.len() {
            self.resize_buckets(target);
        }
    }

    /// Updates the threshold. If the current load now exceeds it, the table
    /// rehashes to double its bucket count (or the load-factor floor, if
    /// larger). Fails with `InvalidArgument` for non-positive or NaN values
    /// and leaves the table untouched.
    pub fn set_max_load_factor(&mut self, max_load_factor: f32) -> Result<(), TableError> {
        check_load_factor(max_load_factor)?;
        self.max_load_factor = max_load_factor;
        if !self.buckets.is_empty() && self.over_threshold(self.len, self.buckets.len()) {
            trace!(
                "max load factor lowered to {}: growing from {} buckets",
                max_load_factor,
                self.buckets.len()
            );
            let target = self.target_bucket_count(self.buckets.len().saturating_mul(2), self.len);
            self.resize_buckets(target);
        }
        Ok(())
    }

    fn over_threshold(&self, entries: usize, buckets: usize) -> bool {
        entries as f64 / buckets as f64 > self.max_load_factor as f64
    }

    /// `max(requested, ceil(entries / max_load_factor), 1)`, checked against
    /// the same predicate that triggers growth.
    fn target_bucket_count(&self, requested: usize, entries: usize) -> usize {
        let floor = (entries as f64 / self.max_load_factor as f64).ceil() as usize;
        let mut target = requested.max(floor).max(1);
        while self.over_threshold(entries, target) {
            target += 1;
        }
        target
    }

    fn resize_buckets(&mut self, target: usize) {
        let current = self.buckets.len();
        if target == current {
            return;
        }
        debug!(
            "rehash: {} -> {} buckets ({} entries)",
            current, target, self.len
        );
        let old = mem::replace(&mut self.buckets, empty_buckets(target));
        for entry in old.into_iter().flatten() {
            let b = (entry.hash % target as u64) as usize;
            self.buckets[b].push(entry);
        }
        self.generation += 1;
    }

    /// Appends an entry for a key known to be absent, growing first if the
    /// new entry would break the load-factor bound. Returns its slot.
    fn push_new(&mut self, hash: u64, key: K, value: V) -> (usize, usize) {
        if self.buckets.is_empty() {
            self.resize_buckets(DEFAULT_BUCKET_COUNT);
        }
        let len = self.len + 1;
        if self.over_threshold(len, self.buckets.len()) {
            trace!(
                "insert of entry {} exceeds max load factor {} at {} buckets",
                len,
                self.max_load_factor,
                self.buckets.len()
            );
            let target = self.target_bucket_count(self.buckets.len().saturating_mul(2), len);
            self.resize_buckets(target);
        }
        let b = (hash % self.buckets.len() as u64) as usize;
        self.buckets[b].push(Entry { key, value, hash });
        self.len = len;
        (b, self.buckets[b].len() - 1)
    }

    /// Swap-with-last removal of the entry at `(b, p)`.
    pub(crate) fn take_slot(&mut self, b: usize, p: usize) -> Entry<K, V> {
        let entry = self.buckets[b].swap_remove(p);
        self.len -= 1;
        self.generation += 1;
        entry
    }

    /// Slot of the entry matching `q`, if any. Every keyed operation goes
    /// through here.
    pub(crate) fn locate<Q>(&self, hash: u64, q: &Q) -> Option<(usize, usize)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        if self.buckets.is_empty() {
            return None;
        }
        let b = (hash % self.buckets.len() as u64) as usize;
        self.buckets[b]
            .iter()
            .position(|e| e.hash == hash && e.key.borrow() == q)
            .map(|p| (b, p))
    }
}

impl<K, V, S> ChainedHashTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Starts with `DEFAULT_BUCKET_COUNT` buckets and the default load factor.
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            buckets: empty_buckets(DEFAULT_BUCKET_COUNT),
            len: 0,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
            id: next_table_id(),
            generation: 0,
            reentrancy: DebugReentrancy::new(),
        }
    }

    pub fn with_config_and_hasher(config: TableConfig, hasher: S) -> Result<Self, TableError> {
        config.validate()?;
        Ok(Self {
            hasher,
            buckets: empty_buckets(config.initial_buckets),
            len: 0,
            max_load_factor: config.max_load_factor,
            id: next_table_id(),
            generation: 0,
            reentrancy: DebugReentrancy::new(),
        })
    }

    pub(crate) fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    /// Inserts or overwrites. Overwriting keeps the entry in place and never
    /// triggers growth; the previous value is returned.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let g = self.reentrancy.enter("insert");
        let hash = self.make_hash(&key);
        if let Some((b, p)) = self.locate(hash, &key) {
            return Some(mem::replace(&mut self.buckets[b][p].value, value));
        }
        drop(g);
        self.push_new(hash, key, value);
        None
    }

    /// Returns the stored value for `key`, inserting `default()` first if the
    /// key is absent. `default` only runs on a miss.
    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let g = self.reentrancy.enter("get_or_insert_with");
        let hash = self.make_hash(&key);
        let found = self.locate(hash, &key);
        drop(g);
        let (b, p) = match found {
            Some(slot) => slot,
            None => self.push_new(hash, key, default()),
        };
        &mut self.buckets[b][p].value
    }

    /// Indexing with insert-on-miss: absent keys get `V::default()`.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter("get");
        let hash = self.make_hash(q);
        self.locate(hash, q).map(|(b, p)| &self.buckets[b][p].value)
    }

    pub fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter("get_key_value");
        let hash = self.make_hash(q);
        self.locate(hash, q).map(|(b, p)| {
            let e = &self.buckets[b][p];
            (&e.key, &e.value)
        })
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter("get_mut");
        let hash = self.make_hash(q);
        let (b, p) = self.locate(hash, q)?;
        Some(&mut self.buckets[b][p].value)
    }

    /// Lookup that never inserts; `KeyNotFound` when absent.
    pub fn at<Q>(&self, q: &Q) -> Result<&V, TableError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(q).ok_or(TableError::KeyNotFound)
    }

    pub fn at_mut<Q>(&mut self, q: &Q) -> Result<&mut V, TableError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get_mut(q).ok_or(TableError::KeyNotFound)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter("contains_key");
        let hash = self.make_hash(q);
        self.locate(hash, q).is_some()
    }

    /// 0 or 1: keys are unique.
    pub fn count<Q>(&self, q: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        usize::from(self.contains_key(q))
    }

    /// Index of the bucket `q` lives in or would be filed under. `None` only
    /// for a table emptied by [`take`](Self::take).
    pub fn bucket<Q>(&self, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        if self.buckets.is_empty() {
            return None;
        }
        let _g = self.reentrancy.enter("bucket");
        Some((self.make_hash(q) % self.buckets.len() as u64) as usize)
    }

    /// Removes the entry for `q` and hands back the owned pair. The bucket's
    /// last entry moves into the vacated slot, so bucket order is not
    /// preserved across removals.
    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let g = self.reentrancy.enter("remove");
        let hash = self.make_hash(q);
        let (b, p) = self.locate(hash, q)?;
        drop(g);
        let entry = self.take_slot(b, p);
        Some((entry.key, entry.value))
    }

    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(q).map(|(_, v)| v)
    }

    /// Number of entries removed: 1 if `q` was present, else 0.
    pub fn erase<Q>(&mut self, q: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        usize::from(self.remove_entry(q).is_some())
    }
}

// Deep copy: every entry is cloned, nothing is shared. The copy is a new
// table as far as cursors are concerned.
impl<K, V, S> Clone for ChainedHashTable<K, V, S>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            hasher: self.hasher.clone(),
            buckets: self.buckets.clone(),
            len: self.len,
            max_load_factor: self.max_load_factor,
            id: next_table_id(),
            generation: 0,
            reentrancy: DebugReentrancy::new(),
        }
    }
}

impl<K, V, S> fmt::Debug for ChainedHashTable<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> PartialEq for ChainedHashTable<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|ov| v == ov))
    }
}

impl<K, V, S> Eq for ChainedHashTable<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, V, S> Extend<(K, V)> for ChainedHashTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for ChainedHashTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::with_hasher(S::default());
        table.extend(iter);
        table
    }
}

impl<K, Q, V, S> Index<&Q> for ChainedHashTable<K, V, S>
where
    K: Eq + Hash + Borrow<Q>,
    Q: ?Sized + Eq + Hash,
    S: BuildHasher,
{
    type Output = V;

    /// Panics if `key` is absent; use [`at`](ChainedHashTable::at) for a
    /// checked lookup.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("key not present in ChainedHashTable")
    }
}
