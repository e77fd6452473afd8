// Cursor integration tests.
//
// Cursors are Copy positions validated against the table they came from.
// Invariants exercised:
// - Traversal is bucket-major and visits every entry once.
// - Bucket-local cursors stop at bucket_end(n).
// - Cursors survive insertion without growth and are rejected after growth.
// - value_mut through a cursor is visible to keyed lookups.
use chained_hashtable::{ChainedHashTable, TableError};
use std::collections::BTreeSet;

// Test: cursor traversal matches iter() order exactly.
#[test]
fn cursor_order_matches_iter() {
    let mut t = ChainedHashTable::with_capacity(7).unwrap();
    for k in 0..30i64 {
        t.insert(k, -k);
    }
    let mut via_cursor = Vec::new();
    let mut c = t.begin();
    while c != t.end() {
        let (k, v) = c.entry(&t).unwrap();
        via_cursor.push((*k, *v));
        c = t.advance(c).unwrap();
    }
    let via_iter: Vec<(i64, i64)> = t.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(via_cursor, via_iter);

    let buckets: Vec<usize> = {
        let mut out = Vec::new();
        let mut c = t.begin();
        while c != t.end() {
            out.push(c.bucket());
            c = t.advance(c).unwrap();
        }
        out
    };
    assert!(buckets.windows(2).all(|w| w[0] <= w[1]), "bucket-major order");
}

// Test: per-bucket traversal covers the whole table when concatenated.
#[test]
fn per_bucket_cursors_cover_table() {
    let mut t = ChainedHashTable::with_capacity(5).unwrap();
    for k in 0..12u8 {
        t.insert(k, ());
    }
    let mut seen = BTreeSet::new();
    for n in 0..t.bucket_count() {
        let end = t.bucket_end(n).unwrap();
        let mut c = t.bucket_begin(n).unwrap();
        let mut in_bucket = 0;
        while c != end {
            assert!(c.is_bucket_local());
            assert_eq!(c.bucket(), n);
            assert!(seen.insert(*c.key(&t).unwrap()));
            c = t.advance(c).unwrap();
            in_bucket += 1;
        }
        assert_eq!(in_bucket, t.bucket_size(n).unwrap());
    }
    assert_eq!(seen.len(), 12);
}

// Test: growth invalidates cursors; plain insertion does not.
#[test]
fn growth_invalidates_cursors() {
    let mut t = ChainedHashTable::with_capacity_and_load_factor(4, 1.0).unwrap();
    t.insert(1u32, 1u32);
    let c = t.find(&1);
    t.insert(2, 2);
    t.insert(3, 3);
    assert_eq!(c.value(&t), Ok(&1));
    let before = t.bucket_count();
    t.insert(4, 4);
    t.insert(5, 5);
    assert!(t.bucket_count() > before);
    assert_eq!(c.value(&t), Err(TableError::InvalidCursor));
    assert_eq!(t.find(&1).value(&t), Ok(&1));
}

// Test: mutation through a cursor.
#[test]
fn cursor_value_mut() {
    let mut t = ChainedHashTable::new();
    t.insert("counter".to_string(), 0u32);
    let c = t.find("counter");
    for _ in 0..3 {
        *c.value_mut(&mut t).unwrap() += 1;
    }
    assert_eq!(t.at("counter"), Ok(&3));
    assert_eq!(c.key(&t).map(String::as_str), Ok("counter"));
}

// Test: clear invalidates outstanding cursors.
#[test]
fn clear_invalidates_cursors() {
    let mut t = ChainedHashTable::new();
    t.insert(1u8, 1u8);
    let c = t.begin();
    t.clear();
    assert_eq!(c.key(&t), Err(TableError::InvalidCursor));
    assert_eq!(t.advance(c), Err(TableError::InvalidCursor));
    assert_eq!(t.begin(), t.end());
}
