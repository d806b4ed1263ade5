//! First insert into an empty tree.

use crate::e2e_tests::helpers::{BLOCK_LEN, HEADER_LEN, TestIndex};
use crate::storage::{NO_BLOCK, ORDER};
use crate::testing::assert_committed_invariants;

#[test]
fn test_single_insert_writes_one_block() {
    let (fixture, mut tree) = TestIndex::create();
    tree.insert(10).expect("insert");
    tree.close().expect("close");

    assert_eq!(fixture.file_len(), HEADER_LEN + BLOCK_LEN);

    let state = assert_committed_invariants(&fixture.path);
    assert_eq!(state.header.root_offset, HEADER_LEN as i64);
    assert_eq!(state.nodes.len(), 1);

    let root = state.node_at(state.header.root_offset);
    assert_eq!(root.used(), 1);
    assert_eq!(root.keys[0], 10);
    assert_eq!(root.children, [NO_BLOCK; ORDER + 1]);
    assert_eq!(root.parent, NO_BLOCK);
}

#[test]
fn test_empty_tree_holds_no_blocks() {
    let (fixture, tree) = TestIndex::create();
    tree.close().expect("close");

    assert_eq!(fixture.file_len(), HEADER_LEN);

    let state = assert_committed_invariants(&fixture.path);
    assert_eq!(state.header.root_offset, NO_BLOCK);
    assert!(state.nodes.is_empty());
}
