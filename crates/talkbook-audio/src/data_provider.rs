//! Immutable byte sources backing managed audio.

use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{AudioError, AudioResult};

/// A cheaply cloneable, immutable byte source.
///
/// Clones share storage; the bytes are released when the last clone drops.
#[derive(Debug, Clone)]
pub enum DataProvider {
    /// Bytes held in memory.
    Memory(Arc<[u8]>),
    /// A byte range of a file on disk.
    File(Arc<FileRange>),
}

/// A byte range inside a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRange {
    /// Path of the file.
    pub path: PathBuf,
    /// Offset of the first byte.
    pub offset: u64,
    /// Number of bytes.
    pub len: u64,
}

impl DataProvider {
    /// Wraps an owned buffer.
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        DataProvider::Memory(bytes.into())
    }

    /// References `len` bytes of `path` starting at `offset`.
    ///
    /// # Errors
    /// [`AudioError::TruncatedStream`] if the file is shorter than the range.
    pub fn from_file_range(path: impl AsRef<Path>, offset: u64, len: u64) -> AudioResult<Self> {
        let path = path.as_ref();
        let available = std::fs::metadata(path)?.len();
        if offset.saturating_add(len) > available {
            return Err(AudioError::TruncatedStream {
                expected: offset.saturating_add(len),
                available,
            });
        }
        Ok(DataProvider::File(Arc::new(FileRange {
            path: path.to_path_buf(),
            offset,
            len,
        })))
    }

    /// Number of bytes in this provider.
    pub fn len(&self) -> u64 {
        match self {
            DataProvider::Memory(bytes) => bytes.len() as u64,
            DataProvider::File(range) => range.len,
        }
    }

    /// Returns true if the provider holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if both handles share the same storage.
    pub fn shares_storage_with(&self, other: &DataProvider) -> bool {
        match (self, other) {
            (DataProvider::Memory(a), DataProvider::Memory(b)) => Arc::ptr_eq(a, b),
            (DataProvider::File(a), DataProvider::File(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Opens a reader over `len` bytes starting at `start` within the provider.
    pub fn open_range(&self, start: u64, len: u64) -> io::Result<Box<dyn Read + Send>> {
        if start.saturating_add(len) > self.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "range {}+{} exceeds data provider of {} bytes",
                    start,
                    len,
                    self.len()
                ),
            ));
        }
        match self {
            DataProvider::Memory(bytes) => {
                let mut cursor = Cursor::new(Arc::clone(bytes));
                cursor.set_position(start);
                Ok(Box::new(cursor.take(len)))
            }
            DataProvider::File(range) => {
                let mut file = File::open(&range.path)?;
                file.seek(SeekFrom::Start(range.offset + start))?;
                Ok(Box::new(BufReader::new(file).take(len)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_provider_range() {
        let provider = DataProvider::from_bytes(vec![1u8, 2, 3, 4, 5, 6]);
        assert_eq!(provider.len(), 6);

        let mut out = Vec::new();
        provider.open_range(2, 3).unwrap().read_to_end(&mut out).unwrap();
        assert_eq!(out, vec![3, 4, 5]);
    }

    #[test]
    fn test_range_outside_provider_is_rejected() {
        let provider = DataProvider::from_bytes(vec![0u8; 4]);
        let err = provider.open_range(3, 2).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_file_provider_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.pcm");
        std::fs::write(&path, (0u8..100).collect::<Vec<_>>()).unwrap();

        let provider = DataProvider::from_file_range(&path, 10, 20).unwrap();
        assert_eq!(provider.len(), 20);

        let mut out = Vec::new();
        provider.open_range(5, 5).unwrap().read_to_end(&mut out).unwrap();
        assert_eq!(out, vec![15, 16, 17, 18, 19]);
    }

    #[test]
    fn test_file_provider_rejects_short_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.pcm");
        std::fs::write(&path, [0u8; 8]).unwrap();

        let err = DataProvider::from_file_range(&path, 4, 8).unwrap_err();
        assert!(matches!(err, AudioError::TruncatedStream { expected: 12, available: 8 }));
    }

    #[test]
    fn test_clones_share_storage() {
        let a = DataProvider::from_bytes(vec![9u8; 16]);
        let b = a.clone();
        let c = DataProvider::from_bytes(vec![9u8; 16]);
        assert!(a.shares_storage_with(&b));
        assert!(!a.shares_storage_with(&c));
    }
}
