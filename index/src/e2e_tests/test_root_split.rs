//! The order-th insert breaks the root into two appended siblings.

use crate::e2e_tests::helpers::{BLOCK_LEN, HEADER_LEN, TestIndex, insert_all};
use crate::storage::NO_BLOCK;
use crate::testing::assert_committed_invariants;

#[test]
fn test_fourth_insert_splits_the_root() {
    let (fixture, mut tree) = TestIndex::create();
    insert_all(&mut tree, &[10, 20, 30, 40]);
    tree.close().expect("close");

    assert_eq!(fixture.file_len(), HEADER_LEN + 3 * BLOCK_LEN);

    let state = assert_committed_invariants(&fixture.path);
    assert_eq!(state.nodes.len(), 3);
    assert_eq!(state.stored_keys(), vec![10, 20, 30, 40]);

    // The root slot right behind the header was rewritten in place.
    let root = state.node_at(state.header.root_offset);
    assert_eq!(state.header.root_offset, HEADER_LEN as i64);
    assert_eq!(root.used(), 1);
    assert_eq!(root.parent, NO_BLOCK);

    // The separator depends on the coin toss; either sibling balance is
    // legal.
    let separator = root.keys[0];
    assert!(separator == 20 || separator == 30);

    let left = state.node_at(root.children[0]);
    let right = state.node_at(root.children[1]);
    assert!(left.keys[..left.used()].iter().all(|&k| k < separator));
    assert!(right.keys[..right.used()].iter().all(|&k| k > separator));
    assert_eq!(left.used() + right.used(), 3);
    assert_eq!(left.parent, state.header.root_offset);
    assert_eq!(right.parent, state.header.root_offset);
}
