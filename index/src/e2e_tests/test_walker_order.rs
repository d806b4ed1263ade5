//! The walker reports blocks by file position, which is append order with
//! the rewritten root slot first.

use crate::e2e_tests::helpers::{BLOCK_LEN, HEADER_LEN, TestIndex, insert_all};
use crate::storage::{NO_BLOCK, Walker};

#[test]
fn test_walker_reports_root_slot_then_appended_siblings() {
    let (fixture, mut tree) = TestIndex::create();
    insert_all(&mut tree, &[10, 20, 30, 40]);
    tree.close().expect("close");

    let mut walker = Walker::open(&fixture.path).expect("open walker");

    // The block behind the header is the rewritten root, not a sibling.
    let (offset, root) = walker.next_node().expect("walk").expect("root block");
    assert_eq!(offset, HEADER_LEN as i64);
    assert_eq!(offset, walker.header().root_offset);
    assert_eq!(root.parent, NO_BLOCK);
    assert_eq!(root.used(), 1);
    let separator = root.keys[0];

    // The left sibling was appended before the right sibling.
    let (offset, left) = walker.next_node().expect("walk").expect("left sibling");
    assert_eq!(offset, (HEADER_LEN + BLOCK_LEN) as i64);
    assert!(left.keys[..left.used()].iter().all(|&k| k < separator));

    let (offset, right) = walker.next_node().expect("walk").expect("right sibling");
    assert_eq!(offset, (HEADER_LEN + 2 * BLOCK_LEN) as i64);
    assert!(right.keys[..right.used()].iter().all(|&k| k > separator));

    assert!(walker.next_node().expect("walk").is_none());
}
