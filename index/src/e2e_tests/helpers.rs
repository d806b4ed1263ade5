//! Common helpers for end-to-end tests.

use std::path::PathBuf;

use tempfile::TempDir;

use crate::storage::btree::BPlusTree;
use crate::storage::{HEADER_BLOCK_SIZE, Key, NODE_BLOCK_SIZE};

/// Header block length as a file length.
pub const HEADER_LEN: u64 = HEADER_BLOCK_SIZE as u64;

/// Node block length as a file length.
pub const BLOCK_LEN: u64 = NODE_BLOCK_SIZE as u64;

/// Fixture holding a fresh index file inside a temp directory that lives as
/// long as the fixture.
pub struct TestIndex {
    _dir: TempDir,
    pub path: PathBuf,
}

impl TestIndex {
    /// Create a fixture together with a new empty index.
    pub fn create() -> (Self, BPlusTree) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("test.idx");
        let tree = BPlusTree::create(&path).expect("create index");
        (Self { _dir: dir, path }, tree)
    }

    /// Length of the index file in bytes.
    pub fn file_len(&self) -> u64 {
        std::fs::metadata(&self.path).expect("stat index file").len()
    }
}

/// Insert every key in order, failing the test on any engine error.
pub fn insert_all(tree: &mut BPlusTree, keys: &[Key]) {
    for &key in keys {
        tree.insert(key).expect("insert key");
    }
}
