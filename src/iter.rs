//! Iterators over a `ChainedHashTable`.
//!
//! All of them walk the table in the same bucket-major order as cursors:
//! bucket 0's chain in its current order, then bucket 1's, and so on.

use crate::chained_hash_table::{Bucket, ChainedHashTable, Entry};
use crate::error::TableError;
use core::iter::FusedIterator;
use core::slice;
use std::vec;

/// Iterator over `(&K, &V)` pairs.
pub struct Iter<'a, K, V> {
    buckets: slice::Iter<'a, Bucket<K, V>>,
    chain: slice::Iter<'a, Entry<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(e) = self.chain.next() {
                self.remaining -= 1;
                return Some((&e.key, &e.value));
            }
            self.chain = self.buckets.next()?.iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets.clone(),
            chain: self.chain.clone(),
            remaining: self.remaining,
        }
    }
}

/// Iterator over `(&K, &mut V)` pairs.
pub struct IterMut<'a, K, V> {
    buckets: slice::IterMut<'a, Bucket<K, V>>,
    chain: slice::IterMut<'a, Entry<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(Entry { key, value, .. }) = self.chain.next() {
                self.remaining -= 1;
                let key: &'a K = key;
                return Some((key, value));
            }
            self.chain = self.buckets.next()?.iter_mut();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// Owning iterator over `(K, V)` pairs.
pub struct IntoIter<K, V> {
    buckets: vec::IntoIter<Bucket<K, V>>,
    chain: vec::IntoIter<Entry<K, V>>,
    remaining: usize,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(e) = self.chain.next() {
                self.remaining -= 1;
                return Some((e.key, e.value));
            }
            self.chain = self.buckets.next()?.into_iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}

pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}
impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}
impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

/// The chain of a single bucket, in its current order.
pub struct BucketIter<'a, K, V> {
    chain: slice::Iter<'a, Entry<K, V>>,
}

impl<'a, K, V> Iterator for BucketIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.chain.next().map(|e| (&e.key, &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chain.size_hint()
    }
}

impl<K, V> ExactSizeIterator for BucketIter<'_, K, V> {}
impl<K, V> FusedIterator for BucketIter<'_, K, V> {}

impl<K, V, S> ChainedHashTable<K, V, S> {
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.buckets.iter(),
            chain: Default::default(),
            remaining: self.len,
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            buckets: self.buckets.iter_mut(),
            chain: Default::default(),
            remaining: self.len,
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Entries of bucket `n`; `IndexOutOfRange` if `n >= bucket_count()`.
    pub fn bucket_iter(&self, n: usize) -> Result<BucketIter<'_, K, V>, TableError> {
        self.check_bucket(n)?;
        Ok(BucketIter {
            chain: self.buckets[n].iter(),
        })
    }
}

impl<'a, K, V, S> IntoIterator for &'a ChainedHashTable<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut ChainedHashTable<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, S> IntoIterator for ChainedHashTable<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            remaining: self.len,
            buckets: self.buckets.into_iter(),
            chain: Default::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ChainedHashTable;
    use std::collections::BTreeMap;

    /// Invariant: every iterator flavor visits each entry exactly once, in
    /// the same order, and reports an exact length.
    #[test]
    fn iterators_agree() {
        let mut t = ChainedHashTable::with_capacity(5).unwrap();
        for k in 0..40u32 {
            t.insert(k, k * 3);
        }
        let pairs: Vec<(u32, u32)> = t.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(pairs.len(), 40);
        assert_eq!(t.iter().len(), 40);

        let keys: Vec<u32> = t.keys().copied().collect();
        let values: Vec<u32> = t.values().copied().collect();
        assert_eq!(keys, pairs.iter().map(|p| p.0).collect::<Vec<_>>());
        assert_eq!(values, pairs.iter().map(|p| p.1).collect::<Vec<_>>());

        let by_bucket: Vec<(u32, u32)> = (0..t.bucket_count())
            .flat_map(|n| t.bucket_iter(n).unwrap().map(|(k, v)| (*k, *v)))
            .collect();
        assert_eq!(by_bucket, pairs);

        let owned: Vec<(u32, u32)> = t.clone().into_iter().collect();
        assert_eq!(owned, pairs);

        let sorted: BTreeMap<u32, u32> = pairs.into_iter().collect();
        assert_eq!(sorted.len(), 40);
        assert!(sorted.iter().all(|(k, v)| *v == k * 3));
    }

    /// Invariant: mutable iteration updates values seen by later lookups.
    #[test]
    fn iter_mut_and_values_mut() {
        let mut t: ChainedHashTable<String, i32> = ChainedHashTable::new();
        for (i, k) in ["k1", "k2", "k3"].iter().enumerate() {
            t.insert(k.to_string(), i as i32);
        }
        for (_k, v) in t.iter_mut() {
            *v += 10;
        }
        for v in t.values_mut() {
            *v *= 2;
        }
        for (k, v) in &mut t {
            assert!(k.starts_with('k'));
            *v += 1;
        }
        assert_eq!(t.get("k1"), Some(&21));
        assert_eq!(t.get("k2"), Some(&23));
        assert_eq!(t.get("k3"), Some(&25));
    }

    /// Invariant: cloned key/value iterators resume independently, and every
    /// projection stays exhausted once drained.
    #[test]
    fn keys_and_values_clone_and_fuse() {
        let mut t = ChainedHashTable::with_capacity(3).unwrap();
        for k in 0..6u8 {
            t.insert(k, u16::from(k) * 10);
        }
        let mut keys = t.keys();
        keys.next();
        let rest: Vec<u8> = keys.clone().copied().collect();
        assert_eq!(rest.len(), 5);
        assert_eq!(keys.copied().collect::<Vec<_>>(), rest);

        let mut values = t.values();
        let snapshot = values.clone();
        assert_eq!(values.by_ref().count(), 6);
        assert_eq!(values.next(), None);
        assert_eq!(values.next(), None);
        assert_eq!(snapshot.len(), 6);

        let mut values_mut = t.values_mut();
        assert_eq!(values_mut.by_ref().count(), 6);
        assert!(values_mut.next().is_none());
    }

    /// Invariant: bucket iteration rejects out-of-range indices.
    #[test]
    fn bucket_iter_out_of_range() {
        let t: ChainedHashTable<u8, u8> = ChainedHashTable::with_capacity(2).unwrap();
        assert!(t.bucket_iter(1).unwrap().next().is_none());
        assert!(t.bucket_iter(2).is_err());
    }
}
