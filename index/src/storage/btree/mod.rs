//! B+ tree engine: node codec, slot operations, and insertion.

mod node;
mod tree;

pub use node::{Node, NodeError};
pub use tree::{BPlusTree, TreeError};
