//! The single in-memory node used as scratch by the tree engine.

use crate::storage::block::{BlockOffset, NO_BLOCK};
use crate::storage::btree::Node;

/// Single-slot owning container for the one decoded node the engine works
/// on, together with the offset it lives at on disk.
///
/// Descent and splits reuse this slot; no multi-node in-memory graph is
/// ever built.
#[derive(Debug)]
pub struct NodeBuffer {
    node: Node,
    offset: BlockOffset,
}

impl NodeBuffer {
    /// Create an empty buffer not yet backed by any block.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            node: Node::new(NO_BLOCK),
            offset: NO_BLOCK,
        }
    }

    /// Replace the buffered node and remember where it lives on disk.
    pub const fn set(&mut self, node: Node, offset: BlockOffset) {
        self.node = node;
        self.offset = offset;
    }

    /// The buffered node.
    #[must_use]
    pub const fn node(&self) -> &Node {
        &self.node
    }

    /// Mutable access to the buffered node.
    pub const fn node_mut(&mut self) -> &mut Node {
        &mut self.node
    }

    /// Offset the buffered node was loaded from or appended at.
    #[must_use]
    pub const fn offset(&self) -> BlockOffset {
        self.offset
    }

    /// Re-home the buffered node to a different block offset.
    pub const fn set_offset(&mut self, offset: BlockOffset) {
        self.offset = offset;
    }
}

impl Default for NodeBuffer {
    fn default() -> Self {
        Self::new()
    }
}
