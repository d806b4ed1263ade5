//! Randomized and adversarial insert sequences hold every structural
//! invariant at each commit point.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::e2e_tests::helpers::{TestIndex, insert_all};
use crate::storage::Key;
use crate::storage::btree::BPlusTree;
use crate::testing::assert_committed_invariants;

#[test]
fn test_random_inserts_keep_invariants() {
    let (fixture, mut tree) = TestIndex::create();

    // Deterministic sequence with plenty of collisions.
    let mut rng = StdRng::seed_from_u64(0xB7EE);
    let mut expected: Vec<Key> = Vec::new();

    for batch in 0..8 {
        for _ in 0..50 {
            let key = rng.random_range(0..500u16);
            tree.insert(key).expect("insert");
            if !expected.contains(&key) {
                expected.push(key);
            }
        }

        // Close and re-check at every batch boundary, then resume.
        tree.close().expect("close");
        let state = assert_committed_invariants(&fixture.path);

        let mut sorted = expected.clone();
        sorted.sort_unstable();
        assert_eq!(state.stored_keys(), sorted, "batch {batch} lost or duplicated keys");

        tree = BPlusTree::open(&fixture.path).expect("reopen");
    }

    tree.close().expect("close");
}

#[test]
fn test_ascending_inserts_cascade_cleanly() {
    let (fixture, mut tree) = TestIndex::create();

    let keys: Vec<Key> = (1..=120).collect();
    insert_all(&mut tree, &keys);
    tree.close().expect("close");

    let state = assert_committed_invariants(&fixture.path);
    assert_eq!(state.stored_keys(), keys);
    // 120 keys at this order cannot fit without interior splits.
    assert!(state.nodes.len() > 40);
}

#[test]
fn test_descending_inserts_cascade_cleanly() {
    let (fixture, mut tree) = TestIndex::create();

    let keys: Vec<Key> = (1..=120).rev().collect();
    insert_all(&mut tree, &keys);
    tree.close().expect("close");

    let state = assert_committed_invariants(&fixture.path);
    let mut sorted = keys;
    sorted.sort_unstable();
    assert_eq!(state.stored_keys(), sorted);
}

#[test]
fn test_key_range_extremes() {
    let (fixture, mut tree) = TestIndex::create();

    insert_all(&mut tree, &[0, Key::MAX, 1, Key::MAX - 1, 0, Key::MAX]);
    tree.close().expect("close");

    let state = assert_committed_invariants(&fixture.path);
    assert_eq!(
        state.stored_keys(),
        vec![0, 1, Key::MAX - 1, Key::MAX]
    );
}
