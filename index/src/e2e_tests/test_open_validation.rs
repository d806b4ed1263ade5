//! Opening rejects files written with a foreign layout.

use crate::storage::btree::{BPlusTree, TreeError};
use crate::storage::{FileHeader, HeaderError, Key, ORDER, Walker, WalkerError};

fn write_header(header: &FileHeader) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("foreign.idx");
    std::fs::write(&path, header.to_block().as_bytes()).expect("write header");
    (dir, path)
}

#[test]
fn test_engine_rejects_larger_tree_order() {
    let mut header = FileHeader::new();
    header.tree_order = (ORDER + 1) as Key;
    let (_dir, path) = write_header(&header);

    let result = BPlusTree::open(&path);
    assert!(matches!(
        result,
        Err(TreeError::Header(HeaderError::IncompatibleOrder(_)))
    ));
}

#[test]
fn test_engine_rejects_mismatched_block_size() {
    let mut header = FileHeader::new();
    header.block_size = 4096;
    let (_dir, path) = write_header(&header);

    let result = BPlusTree::open(&path);
    assert!(matches!(
        result,
        Err(TreeError::Header(HeaderError::LayoutMismatch {
            field: "block_size",
            ..
        }))
    ));
}

#[test]
fn test_engine_accepts_smaller_tree_order() {
    // A file created with a smaller order opens as long as the block
    // layout matches this build.
    let mut header = FileHeader::new();
    header.tree_order = (ORDER - 1) as Key;
    let (_dir, path) = write_header(&header);

    let tree = BPlusTree::open(&path).expect("open");
    tree.close().expect("close");
}

#[test]
fn test_walker_applies_the_same_validation() {
    let mut header = FileHeader::new();
    header.header_size = 512;
    let (_dir, path) = write_header(&header);

    let result = Walker::open(&path);
    assert!(matches!(
        result,
        Err(WalkerError::Header(HeaderError::LayoutMismatch {
            field: "header_size",
            ..
        }))
    ));
}
