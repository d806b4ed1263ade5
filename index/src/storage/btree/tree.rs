//! Tree engine: create or open an index file and insert keys.
//!
//! The engine descends from the root using file offsets as node identity
//! and keeps exactly one decoded node in memory. An overflowing node is
//! resolved by a split cascade that walks parent pointers back toward the
//! root, rewriting the root slot in place when the root itself breaks.

#![allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::storage::block::{
    BlockOffset, HEADER_BLOCK_SIZE, HeaderBlock, Key, NO_BLOCK, NodeBlock, ORDER,
};
use crate::storage::btree::node::{Node, NodeError};
use crate::storage::buffer::NodeBuffer;
use crate::storage::file::{FileError, IndexFile};
use crate::storage::header::{FileHeader, HeaderError};

/// A disk-resident B+ tree over `u16` keys, backed by a single file.
pub struct BPlusTree {
    file: IndexFile,
    header: FileHeader,
    buffer: NodeBuffer,
    rng: StdRng,
}

impl BPlusTree {
    /// Create a new index file, truncating any existing one.
    ///
    /// Post-condition: the file holds exactly the header block.
    pub fn create(path: &Path) -> Result<Self, TreeError> {
        let mut file = IndexFile::create(path)?;
        let header = FileHeader::new();
        file.write_at(0, header.to_block().as_bytes())?;
        file.flush()?;

        Ok(Self {
            file,
            header,
            buffer: NodeBuffer::new(),
            rng: wall_clock_rng(),
        })
    }

    /// Open an existing index file and verify it against the compiled
    /// layout.
    pub fn open(path: &Path) -> Result<Self, TreeError> {
        let mut file = IndexFile::open(path)?;
        let mut block = HeaderBlock::new();
        file.read_at(0, block.as_bytes_mut())?;
        let header = FileHeader::from_block(&block);
        header.validate()?;

        Ok(Self {
            file,
            header,
            buffer: NodeBuffer::new(),
            rng: wall_clock_rng(),
        })
    }

    /// The decoded header of the open index.
    #[must_use]
    pub const fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Insert `key`. Duplicates are suppressed: inserting a stored key
    /// terminates successfully without touching the file.
    pub fn insert(&mut self, key: Key) -> Result<(), TreeError> {
        // One coin toss per insertion; every split in this call's cascade
        // shares it.
        let coin = usize::from(self.rng.random_range(0..=1u8));

        if self.header.root_offset == NO_BLOCK {
            return self.insert_first(key);
        }

        let mut offset = self.header.root_offset;
        loop {
            self.load(offset)?;
            let slot = match self.buffer.node().search(key) {
                Ok(_) => return Ok(()),
                Err(slot) => slot,
            };

            let child = self.buffer.node().child(slot);
            if child == NO_BLOCK {
                self.buffer.node_mut().insert_key(slot, key, NO_BLOCK);
                self.write_buffer()?;
                if self.buffer.node().is_full() {
                    self.split_cascade(coin)?;
                }
                return Ok(());
            }

            offset = child;
        }
    }

    /// Close the index, flushing the underlying file.
    pub fn close(self) -> Result<(), TreeError> {
        self.file.close()?;
        Ok(())
    }

    /// First insert into an empty tree: the root is born right behind the
    /// header, and the header starts pointing at it.
    fn insert_first(&mut self, key: Key) -> Result<(), TreeError> {
        self.header.root_offset = HEADER_BLOCK_SIZE as BlockOffset;
        self.write_header()?;

        let mut root = Node::new(NO_BLOCK);
        root.insert_key(0, key, NO_BLOCK);
        self.buffer.set(root, NO_BLOCK);
        let offset = self.append_buffer()?;
        debug_assert_eq!(offset, self.header.root_offset);
        Ok(())
    }

    /// Resolve an overflowing buffered node, walking parent pointers until
    /// a parent absorbs the separator or the root slot is rebuilt.
    ///
    /// `coin` picks the sibling sizes for the even order:
    /// `left_keys = ORDER/2 - coin`, `right_keys = ORDER/2 + coin - 1`.
    fn split_cascade(&mut self, coin: usize) -> Result<(), TreeError> {
        let left_keys = ORDER / 2 - coin;
        let right_keys = ORDER / 2 + coin - 1;

        loop {
            debug_assert!(self.buffer.node().is_full());
            let scratch = *self.buffer.node();
            let offset = self.buffer.offset();
            let separator = scratch.keys[left_keys];

            if scratch.parent == NO_BLOCK {
                self.split_root(&scratch, left_keys, right_keys, separator)?;
                return Ok(());
            }

            // Shrink the overflowed node into the left sibling at its own
            // offset; its children keep their parent pointer.
            self.buffer.node_mut().truncate(left_keys);
            self.write_buffer()?;

            // The right sibling is appended and adopts the children past
            // the separator.
            let right = Node::from_segment(&scratch, left_keys + 1, right_keys, scratch.parent);
            self.buffer.set(right, NO_BLOCK);
            let right_offset = self.append_buffer()?;
            self.reparent(&scratch.children[left_keys + 1..=ORDER], right_offset)?;

            // The separator moves up, with the right sibling hanging off
            // the slot right of it; the left sibling stays at `offset` in
            // the slot left of it.
            self.load(scratch.parent)?;
            let slot = match self.buffer.node().search(separator) {
                Ok(slot) | Err(slot) => slot,
            };
            debug_assert_eq!(self.buffer.node().child(slot), offset);
            self.buffer
                .node_mut()
                .insert_key(slot, separator, right_offset);
            self.write_buffer()?;

            if !self.buffer.node().is_full() {
                return Ok(());
            }
        }
    }

    /// Root overflow: both siblings are appended, then the root slot is
    /// rewritten in place as a one-key node over them.
    fn split_root(
        &mut self,
        scratch: &Node,
        left_keys: usize,
        right_keys: usize,
        separator: Key,
    ) -> Result<(), TreeError> {
        let root_offset = self.header.root_offset;

        let left = Node::from_segment(scratch, 0, left_keys, root_offset);
        self.buffer.set(left, NO_BLOCK);
        let left_offset = self.append_buffer()?;
        self.reparent(&scratch.children[..=left_keys], left_offset)?;

        let right = Node::from_segment(scratch, left_keys + 1, right_keys, root_offset);
        self.buffer.set(right, NO_BLOCK);
        let right_offset = self.append_buffer()?;
        self.reparent(&scratch.children[left_keys + 1..=ORDER], right_offset)?;

        let root = Node::with_children(NO_BLOCK, left_offset, separator, right_offset);
        self.buffer.set(root, root_offset);
        self.write_buffer()?;
        Ok(())
    }

    /// Rewrite the parent field of every present child offset in
    /// `children`.
    fn reparent(
        &mut self,
        children: &[BlockOffset],
        parent: BlockOffset,
    ) -> Result<(), TreeError> {
        for &child in children {
            if child == NO_BLOCK {
                continue;
            }
            self.load(child)?;
            self.buffer.node_mut().parent = parent;
            self.write_buffer()?;
        }
        Ok(())
    }

    /// Load the block at `offset` into the node buffer.
    fn load(&mut self, offset: BlockOffset) -> Result<(), TreeError> {
        let mut block = NodeBlock::new();
        self.file.read_at(offset, block.as_bytes_mut())?;
        let node = Node::from_block(&block)?;
        self.buffer.set(node, offset);
        Ok(())
    }

    /// Write the buffered node back at its own offset and flush.
    fn write_buffer(&mut self) -> Result<(), TreeError> {
        let block = self.buffer.node().to_block();
        self.file.write_at(self.buffer.offset(), block.as_bytes())?;
        self.file.flush()?;
        Ok(())
    }

    /// Append the buffered node, re-homing the buffer to the offset the
    /// block landed at, and flush.
    fn append_buffer(&mut self) -> Result<BlockOffset, TreeError> {
        let block = self.buffer.node().to_block();
        let offset = self.file.append(block.as_bytes())?;
        self.buffer.set_offset(offset);
        self.file.flush()?;
        Ok(offset)
    }

    /// Rewrite the header block and flush.
    fn write_header(&mut self) -> Result<(), TreeError> {
        self.file.write_at(0, self.header.to_block().as_bytes())?;
        self.file.flush()?;
        Ok(())
    }
}

impl std::fmt::Debug for BPlusTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BPlusTree")
            .field("header", &self.header)
            .finish_non_exhaustive()
    }
}

/// Seed the split tie-breaker from wall-clock time. The coin toss needs
/// variety across runs, not cryptographic quality.
fn wall_clock_rng() -> StdRng {
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos() as u64);
    StdRng::seed_from_u64(seed)
}

/// Errors that can occur during tree operations.
#[derive(Debug)]
pub enum TreeError {
    /// File-system failure.
    File(FileError),
    /// Header incompatibility.
    Header(HeaderError),
    /// Node block decode failure.
    Node(NodeError),
    /// Lookup against an empty tree. Reserved for a future search path;
    /// insertion never produces it.
    Empty,
}

impl std::fmt::Display for TreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(e) => write!(f, "file error: {e}"),
            Self::Header(e) => write!(f, "header error: {e}"),
            Self::Node(e) => write!(f, "node error: {e}"),
            Self::Empty => write!(f, "tree is empty"),
        }
    }
}

impl std::error::Error for TreeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::File(e) => Some(e),
            Self::Header(e) => Some(e),
            Self::Node(e) => Some(e),
            Self::Empty => None,
        }
    }
}

impl From<FileError> for TreeError {
    fn from(e: FileError) -> Self {
        Self::File(e)
    }
}

impl From<HeaderError> for TreeError {
    fn from(e: HeaderError) -> Self {
        Self::Header(e)
    }
}

impl From<NodeError> for TreeError {
    fn from(e: NodeError) -> Self {
        Self::Node(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::block::NODE_BLOCK_SIZE;
    use tempfile::tempdir;

    fn node_at(path: &Path, offset: u64) -> Node {
        let bytes = std::fs::read(path).expect("read index file");
        let mut block = NodeBlock::new();
        let end = offset as usize + NODE_BLOCK_SIZE;
        block
            .as_bytes_mut()
            .copy_from_slice(&bytes[offset as usize..end]);
        Node::from_block(&block).expect("decode node")
    }

    #[test]
    fn test_create_writes_header_only() {
        let dir = tempdir().expect("create temp dir");
        let path = dir.path().join("test.idx");

        let tree = BPlusTree::create(&path).expect("create");
        assert_eq!(tree.header().root_offset, NO_BLOCK);
        tree.close().expect("close");

        let len = std::fs::metadata(&path).expect("stat").len();
        assert_eq!(len, HEADER_BLOCK_SIZE as u64);
    }

    #[test]
    fn test_first_insert_appends_the_root() {
        let dir = tempdir().expect("create temp dir");
        let path = dir.path().join("test.idx");

        let mut tree = BPlusTree::create(&path).expect("create");
        tree.insert(10).expect("insert");
        assert_eq!(tree.header().root_offset, HEADER_BLOCK_SIZE as i64);
        tree.close().expect("close");

        let len = std::fs::metadata(&path).expect("stat").len();
        assert_eq!(len, (HEADER_BLOCK_SIZE + NODE_BLOCK_SIZE) as u64);

        let root = node_at(&path, HEADER_BLOCK_SIZE as u64);
        assert_eq!(root.used(), 1);
        assert_eq!(root.keys[0], 10);
        assert_eq!(root.children, [NO_BLOCK; ORDER + 1]);
        assert_eq!(root.parent, NO_BLOCK);
    }

    #[test]
    fn test_reopen_keeps_the_root() {
        let dir = tempdir().expect("create temp dir");
        let path = dir.path().join("test.idx");

        {
            let mut tree = BPlusTree::create(&path).expect("create");
            tree.insert(7).expect("insert");
            tree.close().expect("close");
        }

        let mut tree = BPlusTree::open(&path).expect("open");
        assert_eq!(tree.header().root_offset, HEADER_BLOCK_SIZE as i64);
        tree.insert(9).expect("insert");
        tree.close().expect("close");

        let root = node_at(&path, HEADER_BLOCK_SIZE as u64);
        assert_eq!(root.keys[..2], [7, 9]);
    }

    #[test]
    fn test_open_rejects_incompatible_order() {
        let dir = tempdir().expect("create temp dir");
        let path = dir.path().join("test.idx");

        let mut header = FileHeader::new();
        header.tree_order = (ORDER + 3) as Key;
        std::fs::write(&path, header.to_block().as_bytes()).expect("write header");

        let result = BPlusTree::open(&path);
        assert!(matches!(
            result,
            Err(TreeError::Header(HeaderError::IncompatibleOrder(_)))
        ));
    }

    #[test]
    fn test_open_rejects_truncated_file() {
        let dir = tempdir().expect("create temp dir");
        let path = dir.path().join("test.idx");

        std::fs::write(&path, b"short").expect("write file");

        let result = BPlusTree::open(&path);
        assert!(matches!(result, Err(TreeError::File(FileError::Read(_)))));
    }

    #[test]
    fn test_root_split_file_shape() {
        let dir = tempdir().expect("create temp dir");
        let path = dir.path().join("test.idx");

        let mut tree = BPlusTree::create(&path).expect("create");
        for key in [10, 20, 30, 40] {
            tree.insert(key).expect("insert");
        }
        tree.close().expect("close");

        let len = std::fs::metadata(&path).expect("stat").len();
        assert_eq!(len, (HEADER_BLOCK_SIZE + 3 * NODE_BLOCK_SIZE) as u64);

        let header_size = HEADER_BLOCK_SIZE as u64;
        let block_size = NODE_BLOCK_SIZE as u64;
        let root = node_at(&path, header_size);
        let left = node_at(&path, header_size + block_size);
        let right = node_at(&path, header_size + 2 * block_size);

        assert_eq!(root.used(), 1);
        assert!(root.keys[0] == 20 || root.keys[0] == 30);
        assert_eq!(root.parent, NO_BLOCK);
        assert_eq!(root.children[0], (header_size + block_size) as i64);
        assert_eq!(root.children[1], (header_size + 2 * block_size) as i64);

        assert_eq!(left.parent, header_size as i64);
        assert_eq!(right.parent, header_size as i64);
        assert!(left.keys[..left.used()].iter().all(|&k| k < root.keys[0]));
        assert!(right.keys[..right.used()].iter().all(|&k| k > root.keys[0]));
    }

    #[test]
    fn test_insert_after_root_split_lands_in_a_sibling() {
        let dir = tempdir().expect("create temp dir");
        let path = dir.path().join("test.idx");

        let mut tree = BPlusTree::create(&path).expect("create");
        for key in [10, 20, 30, 40, 50] {
            tree.insert(key).expect("insert");
        }
        tree.close().expect("close");

        // The fifth key descends through the root; no second split yet.
        let len = std::fs::metadata(&path).expect("stat").len();
        assert_eq!(len, (HEADER_BLOCK_SIZE + 3 * NODE_BLOCK_SIZE) as u64);

        let root = node_at(&path, HEADER_BLOCK_SIZE as u64);
        assert_eq!(root.used(), 1);

        let right = node_at(&path, (HEADER_BLOCK_SIZE + 2 * NODE_BLOCK_SIZE) as u64);
        assert_eq!(right.keys[right.used() - 1], 50);
    }

    #[test]
    fn test_duplicate_insert_is_suppressed() {
        let dir = tempdir().expect("create temp dir");
        let path = dir.path().join("test.idx");

        let mut tree = BPlusTree::create(&path).expect("create");
        tree.insert(7).expect("insert");
        tree.insert(7).expect("insert duplicate");
        tree.insert(7).expect("insert duplicate");
        tree.close().expect("close");

        let len = std::fs::metadata(&path).expect("stat").len();
        assert_eq!(len, (HEADER_BLOCK_SIZE + NODE_BLOCK_SIZE) as u64);

        let root = node_at(&path, HEADER_BLOCK_SIZE as u64);
        assert_eq!(root.used(), 1);
        assert_eq!(root.keys[0], 7);
    }
}
