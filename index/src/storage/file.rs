//! Index file I/O: fixed-size blocks at stable byte offsets.
//!
//! Blocks are read and written at explicit byte offsets; new blocks are
//! only ever appended, so an offset handed out once stays valid for the
//! lifetime of the file.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::storage::block::BlockOffset;

/// An open index file with block-level I/O.
#[derive(Debug)]
pub struct IndexFile {
    file: File,
}

impl IndexFile {
    /// Create a new index file, truncating any existing one.
    pub fn create(path: &Path) -> Result<Self, FileError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(FileError::Create)?;

        Ok(Self { file })
    }

    /// Open an existing index file for reading and writing.
    pub fn open(path: &Path) -> Result<Self, FileError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(FileError::Open)?;

        Ok(Self { file })
    }

    /// Open an existing index file read-only.
    pub fn open_read(path: &Path) -> Result<Self, FileError> {
        let file = File::open(path).map_err(FileError::Open)?;
        Ok(Self { file })
    }

    /// Read exactly `buf.len()` bytes starting at `offset`.
    ///
    /// A short read is a `Read` failure; frame sizes are fixed.
    pub fn read_at(&mut self, offset: BlockOffset, buf: &mut [u8]) -> Result<(), FileError> {
        self.seek_to(offset)?;
        self.file.read_exact(buf).map_err(FileError::Read)
    }

    /// Write all of `buf` starting at `offset`.
    pub fn write_at(&mut self, offset: BlockOffset, buf: &[u8]) -> Result<(), FileError> {
        self.seek_to(offset)?;
        self.file.write_all(buf).map_err(FileError::Write)
    }

    /// Append `buf` at the end of the file, returning the offset it landed
    /// at (the pre-append file length).
    #[allow(clippy::cast_possible_wrap)] // file lengths stay far below i64::MAX
    pub fn append(&mut self, buf: &[u8]) -> Result<BlockOffset, FileError> {
        let end = self.file.seek(SeekFrom::End(0)).map_err(FileError::Seek)?;
        self.file.write_all(buf).map_err(FileError::Write)?;
        Ok(end as BlockOffset)
    }

    /// Current file length in bytes.
    pub fn byte_len(&mut self) -> Result<u64, FileError> {
        self.file.seek(SeekFrom::End(0)).map_err(FileError::Seek)
    }

    /// Flush the underlying stream.
    ///
    /// This pushes buffered writes down to the operating system; it is not
    /// an `fsync`-level durability barrier.
    pub fn flush(&mut self) -> Result<(), FileError> {
        self.file.flush().map_err(FileError::Write)
    }

    /// Flush and drop the handle.
    pub fn close(mut self) -> Result<(), FileError> {
        self.file.flush().map_err(FileError::Close)
    }

    fn seek_to(&mut self, offset: BlockOffset) -> Result<(), FileError> {
        let target = u64::try_from(offset).map_err(|_| {
            FileError::Seek(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("negative block offset {offset}"),
            ))
        })?;

        self.file
            .seek(SeekFrom::Start(target))
            .map_err(FileError::Seek)?;

        Ok(())
    }
}

/// Errors that can occur during index file operations, by syscall kind.
#[derive(Debug)]
pub enum FileError {
    /// Failed to create the file.
    Create(io::Error),
    /// Failed to open the file.
    Open(io::Error),
    /// Failed to read a block.
    Read(io::Error),
    /// Failed to write a block.
    Write(io::Error),
    /// Failed to move the file cursor.
    Seek(io::Error),
    /// Failed to close the file.
    Close(io::Error),
}

impl std::fmt::Display for FileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create(e) => write!(f, "failed to create index file: {e}"),
            Self::Open(e) => write!(f, "failed to open index file: {e}"),
            Self::Read(e) => write!(f, "failed to read block: {e}"),
            Self::Write(e) => write!(f, "failed to write block: {e}"),
            Self::Seek(e) => write!(f, "failed to move file cursor: {e}"),
            Self::Close(e) => write!(f, "failed to close index file: {e}"),
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Create(e)
            | Self::Open(e)
            | Self::Read(e)
            | Self::Write(e)
            | Self::Seek(e)
            | Self::Close(e) => Some(e),
        }
    }
}
