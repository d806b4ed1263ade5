//! Shared test support: structural checking of committed index files.

use std::path::Path;

use crate::storage::btree::Node;
use crate::storage::{BlockOffset, FileHeader, Key, NO_BLOCK, ORDER, Walker};

/// Snapshot of a committed index file, in file order.
pub struct FileState {
    pub header: FileHeader,
    pub nodes: Vec<(BlockOffset, Node)>,
}

impl FileState {
    /// All stored keys across every node, sorted.
    pub fn stored_keys(&self) -> Vec<Key> {
        let mut keys: Vec<Key> = self
            .nodes
            .iter()
            .flat_map(|(_, node)| node.keys[..node.used()].iter().copied())
            .collect();
        keys.sort_unstable();
        keys
    }

    /// The node stored at `offset`.
    pub fn node_at(&self, offset: BlockOffset) -> &Node {
        self.nodes
            .iter()
            .find(|&&(o, _)| o == offset)
            .map_or_else(
                || panic!("no node block at offset {offset}"),
                |(_, node)| node,
            )
    }
}

/// Walk `path` and assert every structural invariant of a committed index.
///
/// Returns the snapshot so callers can add scenario-specific assertions.
/// File-length quantization is enforced by `Walker::open` itself.
pub fn assert_committed_invariants(path: &Path) -> FileState {
    let mut walker = Walker::open(path).expect("walker should open the file");
    let header = *walker.header();

    let mut nodes = Vec::new();
    while let Some(entry) = walker.next_node().expect("node blocks should decode") {
        nodes.push(entry);
    }

    if header.root_offset == NO_BLOCK {
        assert!(nodes.is_empty(), "empty tree must hold no node blocks");
        return FileState { header, nodes };
    }

    let mut roots = 0;
    for &(offset, ref node) in &nodes {
        let used = node.used();

        // Every committed node is non-empty and below the full order.
        assert!(used > 0, "node at {offset} is empty");
        assert!(used < ORDER, "node at {offset} holds a full order of keys");

        let keys = &node.keys[..used];
        assert!(
            keys.windows(2).all(|pair| pair[0] <= pair[1]),
            "keys out of order at {offset}: {keys:?}"
        );

        assert!(
            node.children[used + 1..].iter().all(|&c| c == NO_BLOCK),
            "stray child slot past keys_used at {offset}"
        );

        if node.parent == NO_BLOCK {
            roots += 1;
            assert_eq!(
                offset, header.root_offset,
                "parentless node at {offset} is not the root"
            );
        } else {
            let parent = nodes
                .iter()
                .find(|&&(o, _)| o == node.parent)
                .map_or_else(
                    || panic!("node at {offset} points at missing parent {}", node.parent),
                    |(_, n)| n,
                );
            let links = parent.children[..=parent.used()]
                .iter()
                .filter(|&&c| c == offset)
                .count();
            assert_eq!(links, 1, "parent of node at {offset} links it {links} times");
        }
    }
    assert_eq!(roots, 1, "expected exactly one parentless root node");

    FileState { header, nodes }
}
