//! Filling a node up to one key short of the order stays split-free.

use crate::e2e_tests::helpers::{BLOCK_LEN, HEADER_LEN, TestIndex, insert_all};
use crate::testing::assert_committed_invariants;

#[test]
fn test_three_keys_stay_in_the_root() {
    let (fixture, mut tree) = TestIndex::create();
    insert_all(&mut tree, &[10, 20, 30]);
    tree.close().expect("close");

    assert_eq!(fixture.file_len(), HEADER_LEN + BLOCK_LEN);

    let state = assert_committed_invariants(&fixture.path);
    assert_eq!(state.nodes.len(), 1);

    let root = state.node_at(state.header.root_offset);
    assert_eq!(root.used(), 3);
    assert_eq!(root.keys[..3], [10, 20, 30]);
}

#[test]
fn test_out_of_order_input_is_stored_sorted() {
    let (fixture, mut tree) = TestIndex::create();
    insert_all(&mut tree, &[30, 10, 20]);
    tree.close().expect("close");

    let state = assert_committed_invariants(&fixture.path);
    let root = state.node_at(state.header.root_offset);
    assert_eq!(root.keys[..3], [10, 20, 30]);
}
