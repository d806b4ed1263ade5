//! Duplicate keys are suppressed without touching the file.

use crate::e2e_tests::helpers::{BLOCK_LEN, HEADER_LEN, TestIndex, insert_all};
use crate::storage::btree::BPlusTree;
use crate::testing::assert_committed_invariants;

#[test]
fn test_repeated_key_is_stored_once() {
    let (fixture, mut tree) = TestIndex::create();
    insert_all(&mut tree, &[7, 7, 7]);
    tree.close().expect("close");

    assert_eq!(fixture.file_len(), HEADER_LEN + BLOCK_LEN);

    let state = assert_committed_invariants(&fixture.path);
    assert_eq!(state.stored_keys(), vec![7]);
}

#[test]
fn test_duplicate_insert_leaves_the_file_byte_identical() {
    let (fixture, mut tree) = TestIndex::create();
    insert_all(&mut tree, &[10, 20, 30, 40, 50]);
    tree.close().expect("close");

    let before = std::fs::read(&fixture.path).expect("read file");

    let mut tree = BPlusTree::open(&fixture.path).expect("open");
    for &key in &[10, 20, 30, 40, 50] {
        tree.insert(key).expect("insert duplicate");
    }
    tree.close().expect("close");

    let after = std::fs::read(&fixture.path).expect("read file");
    assert_eq!(before, after);
}

#[test]
fn test_duplicate_of_a_separator_is_suppressed() {
    let (fixture, mut tree) = TestIndex::create();
    insert_all(&mut tree, &[10, 20, 30, 40]);

    // Whichever separator the coin picked, re-inserting it must hit the
    // duplicate check at the root.
    tree.insert(20).expect("insert");
    tree.insert(30).expect("insert");
    tree.close().expect("close");

    let state = assert_committed_invariants(&fixture.path);
    assert_eq!(state.stored_keys(), vec![10, 20, 30, 40]);
}
