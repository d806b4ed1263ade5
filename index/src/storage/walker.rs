//! Read-only enumerator over every node block in file order.

#![allow(clippy::cast_possible_wrap)]

use std::path::Path;

use crate::storage::block::{BlockOffset, HeaderBlock, NodeBlock};
use crate::storage::btree::{Node, NodeError};
use crate::storage::file::{FileError, IndexFile};
use crate::storage::header::{FileHeader, HeaderError};

/// Walks the node blocks of an index file from the first block after the
/// header to end-of-file, in append order, without touching the tree
/// engine.
#[derive(Debug)]
pub struct Walker {
    file: IndexFile,
    header: FileHeader,
    next_offset: u64,
    end: u64,
}

impl Walker {
    /// Open `path` read-only, decode and validate the header, and position
    /// at the first node block.
    pub fn open(path: &Path) -> Result<Self, WalkerError> {
        let mut file = IndexFile::open_read(path)?;
        let mut block = HeaderBlock::new();
        file.read_at(0, block.as_bytes_mut())?;
        let header = FileHeader::from_block(&block);
        header.validate()?;

        let end = file.byte_len()?;
        if end.saturating_sub(header.header_size) % header.block_size != 0 {
            return Err(WalkerError::TrailingBytes { file_len: end });
        }

        Ok(Self {
            file,
            header,
            next_offset: header.header_size,
            end,
        })
    }

    /// The decoded header of the walked file.
    #[must_use]
    pub const fn header(&self) -> &FileHeader {
        &self.header
    }

    /// The next node block in file order, or `None` past the last one.
    pub fn next_node(&mut self) -> Result<Option<(BlockOffset, Node)>, WalkerError> {
        if self.next_offset >= self.end {
            return Ok(None);
        }

        let offset = self.next_offset as BlockOffset;
        let mut block = NodeBlock::new();
        self.file.read_at(offset, block.as_bytes_mut())?;
        let node = Node::from_block(&block)?;
        self.next_offset += self.header.block_size;
        Ok(Some((offset, node)))
    }
}

/// Errors that can occur while walking an index file.
#[derive(Debug)]
pub enum WalkerError {
    /// File-system failure.
    File(FileError),
    /// Header incompatibility.
    Header(HeaderError),
    /// Node block decode failure.
    Node(NodeError),
    /// The file length is not header plus a whole number of node blocks.
    TrailingBytes { file_len: u64 },
}

impl std::fmt::Display for WalkerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(e) => write!(f, "file error: {e}"),
            Self::Header(e) => write!(f, "header error: {e}"),
            Self::Node(e) => write!(f, "node error: {e}"),
            Self::TrailingBytes { file_len } => {
                write!(f, "file length {file_len} is not a whole number of blocks")
            }
        }
    }
}

impl std::error::Error for WalkerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::File(e) => Some(e),
            Self::Header(e) => Some(e),
            Self::Node(e) => Some(e),
            Self::TrailingBytes { .. } => None,
        }
    }
}

impl From<FileError> for WalkerError {
    fn from(e: FileError) -> Self {
        Self::File(e)
    }
}

impl From<HeaderError> for WalkerError {
    fn from(e: HeaderError) -> Self {
        Self::Header(e)
    }
}

impl From<NodeError> for WalkerError {
    fn from(e: NodeError) -> Self {
        Self::Node(e)
    }
}
