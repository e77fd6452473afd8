#![cfg(test)]

// Property tests for ChainedHashTable kept inside the crate so they can
// check bucket-level bookkeeping directly.

use crate::{ChainedHashTable, TableConfig, TableError};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations so shrinking moves toward earlier keys and
// shorter op lists.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    GetOrDefault(usize, i32),
    Erase(usize),
    EraseAtFind(usize),
    At(usize),
    Contains(String),
    Rehash(usize),
    SetMaxLoadFactor(f32),
    Clear,
    Traverse,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=12).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::GetOrDefault(i, d)),
            2 => idx.clone().prop_map(OpI::Erase),
            1 => idx.clone().prop_map(OpI::EraseAtFind),
            1 => idx.clone().prop_map(OpI::At),
            1 => prop_oneof![contains_pool, "[a-z]{0,5}"].prop_map(OpI::Contains),
            1 => (0usize..40).prop_map(OpI::Rehash),
            1 => (0.1f32..4.0).prop_map(OpI::SetMaxLoadFactor),
            1 => Just(OpI::Clear),
            1 => Just(OpI::Traverse),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn run_scenario<S: BuildHasher>(
    mut sut: ChainedHashTable<Key, i32, S>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<Key, i32> = HashMap::new();

    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = key_from(pool, i);
                let prev = sut.insert(k.clone(), v);
                prop_assert_eq!(prev, model.insert(k, v));
            }
            OpI::GetOrDefault(i, d) => {
                let k = key_from(pool, i);
                let slot = sut.get_or_insert_default(k.clone());
                *slot = slot.wrapping_add(d);
                let m = model.entry(k).or_default();
                *m = m.wrapping_add(d);
            }
            OpI::Erase(i) => {
                let k = key_from(pool, i);
                let expected = usize::from(model.remove(&k).is_some());
                prop_assert_eq!(sut.erase(&k), expected);
                prop_assert!(!sut.contains_key(&k));
            }
            OpI::EraseAtFind(i) => {
                let k = key_from(pool, i);
                let c = sut.find(&k);
                if model.remove(&k).is_some() {
                    let (kk, _v, next) = sut.remove_at(c).expect("found cursor is valid");
                    prop_assert!(kk == k);
                    // The returned cursor is usable: either end or an entry.
                    if next != sut.end() {
                        prop_assert!(next.key(&sut).is_ok());
                    }
                } else {
                    prop_assert_eq!(c, sut.end());
                    prop_assert_eq!(sut.erase_at(c), Err(TableError::InvalidCursor));
                }
            }
            OpI::At(i) => {
                let k = key_from(pool, i);
                match model.get(&k) {
                    Some(v) => prop_assert_eq!(sut.at(&k), Ok(v)),
                    None => prop_assert_eq!(sut.at(&k), Err(TableError::KeyNotFound)),
                }
            }
            OpI::Contains(s) => {
                let has_model = model.keys().any(|k| k.0 == s);
                prop_assert_eq!(sut.contains_key(s.as_str()), has_model);
                prop_assert_eq!(sut.count(s.as_str()), usize::from(has_model));
            }
            OpI::Rehash(n) => {
                let before: BTreeSet<(Key, i32)> =
                    sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                sut.rehash(n);
                prop_assert!(sut.bucket_count() >= n.max(1));
                let after: BTreeSet<(Key, i32)> =
                    sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(before, after);
            }
            OpI::SetMaxLoadFactor(lf) => {
                sut.set_max_load_factor(lf).expect("positive load factor accepted");
                prop_assert_eq!(sut.max_load_factor(), lf);
            }
            OpI::Clear => {
                let buckets = sut.bucket_count();
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.bucket_count(), buckets);
            }
            OpI::Traverse => {
                let mut c = sut.begin();
                let mut seen = BTreeSet::new();
                while c != sut.end() {
                    prop_assert!(seen.insert(c.key(&sut).expect("live cursor").clone()));
                    c = sut.advance(c).expect("advance stays valid");
                }
                let m_keys: BTreeSet<Key> = model.keys().cloned().collect();
                prop_assert_eq!(seen, m_keys);
            }
        }

        // Post-conditions after each op
        // 1) Size parity, and bucket sizes add up to len
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        let sum: usize = sut.buckets.iter().map(Vec::len).sum();
        prop_assert_eq!(sum, sut.len());
        // 2) Load factor never exceeds the threshold
        prop_assert!(sut.load_factor() <= sut.max_load_factor());
        // 3) Every entry lives in the bucket its stored hash selects
        let n = sut.bucket_count() as u64;
        for (b, chain) in sut.buckets.iter().enumerate() {
            for e in chain {
                prop_assert_eq!((e.hash % n) as usize, b);
            }
        }
        // 4) Full traversal count equals len
        prop_assert_eq!(sut.iter().count(), sut.len());
    }
    Ok(())
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - insert returns the previous value exactly when the model had one.
// - erase reports 1/0 and removes the key; erase_at(find(k)) removes k.
// - at() agrees with the model and signals KeyNotFound on a miss.
// - rehash preserves the set of pairs and honors the requested minimum.
// - len == sum of bucket sizes == traversal count; load <= max after every op.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine(
        (pool, ops) in arb_scenario(),
        buckets in 1usize..16,
        lf in 0.25f32..3.0
    ) {
        let sut: ChainedHashTable<Key, i32> = ChainedHashTable::with_config(
            TableConfig::new().with_initial_buckets(buckets).with_max_load_factor(lf),
        ).unwrap();
        run_scenario(sut, &pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress chain handling.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Property: Same invariants with every key in one chain. Swap-with-last
// erase and cursor successors are exercised on long buckets.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let sut = ChainedHashTable::with_config_and_hasher(
            TableConfig::new().with_initial_buckets(2),
            ConstBuildHasher,
        ).unwrap();
        run_scenario(sut, &pool, ops)?;
    }
}

// Property: Erasing every entry through the cursor returned by the previous
// erase visits each entry exactly once and empties the table.
proptest! {
    #[test]
    fn prop_erase_at_walk_drains(keys in proptest::collection::btree_set(any::<u16>(), 0..200)) {
        let mut t = ChainedHashTable::with_capacity(4).unwrap();
        for &k in &keys {
            t.insert(k, u32::from(k));
        }
        let mut removed = BTreeSet::new();
        let mut c = t.begin();
        while c != t.end() {
            let (k, v, next) = t.remove_at(c).expect("cursor from previous erase is valid");
            prop_assert_eq!(v, u32::from(k));
            prop_assert!(removed.insert(k));
            c = next;
        }
        prop_assert!(t.is_empty());
        prop_assert_eq!(removed, keys);
    }
}
