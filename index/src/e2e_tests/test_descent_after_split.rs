//! After a root split, further inserts descend into the right sibling.

use crate::e2e_tests::helpers::{BLOCK_LEN, HEADER_LEN, TestIndex, insert_all};
use crate::testing::assert_committed_invariants;

#[test]
fn test_fifth_insert_lands_in_a_sibling() {
    let (fixture, mut tree) = TestIndex::create();
    insert_all(&mut tree, &[10, 20, 30, 40, 50]);
    tree.close().expect("close");

    // The siblings still have room, so no second split happened.
    assert_eq!(fixture.file_len(), HEADER_LEN + 3 * BLOCK_LEN);

    let state = assert_committed_invariants(&fixture.path);
    assert_eq!(state.stored_keys(), vec![10, 20, 30, 40, 50]);

    let root = state.node_at(state.header.root_offset);
    assert_eq!(root.used(), 1);

    // 50 is above any possible separator, so it must sit in the right
    // sibling, not in the root.
    let right = state.node_at(root.children[1]);
    assert_eq!(right.keys[right.used() - 1], 50);
}

#[test]
fn test_small_key_lands_in_the_left_sibling() {
    let (fixture, mut tree) = TestIndex::create();
    insert_all(&mut tree, &[10, 20, 30, 40, 5]);
    tree.close().expect("close");

    let state = assert_committed_invariants(&fixture.path);
    assert_eq!(state.stored_keys(), vec![5, 10, 20, 30, 40]);

    let root = state.node_at(state.header.root_offset);
    let left = state.node_at(root.children[0]);
    assert_eq!(left.keys[0], 5);
}
