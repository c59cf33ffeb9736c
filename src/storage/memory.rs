//! In-memory storage with fault injection.

use std::collections::HashMap;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use log::trace;

use super::Storage;

/// A failure to inject for one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// `open` fails.
    Open,
    /// Seeking to the end fails.
    SeekEnd,
    /// Querying the offset fails.
    Tell,
    /// Seeking back to the start fails.
    SeekStart,
    /// Reads return at most this many bytes in total.
    ShortRead(usize),
    /// The end of the file reports this length instead of the real one.
    ReportLength(u64),
}

/// Read-only path-to-bytes storage.
///
/// Keeps a count of handles that are still open so tests can check that
/// every exit path released its file.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: HashMap<PathBuf, Vec<u8>>,
    faults: HashMap<PathBuf, Fault>,
    open_handles: Arc<AtomicUsize>,
}

impl MemoryStorage {
    /// Create empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file.
    pub fn with_file(mut self, path: impl Into<PathBuf>, data: impl Into<Vec<u8>>) -> Self {
        self.insert(path, data);
        self
    }

    /// Inject a fault for `path`.
    pub fn with_fault(mut self, path: impl Into<PathBuf>, fault: Fault) -> Self {
        self.faults.insert(path.into(), fault);
        self
    }

    /// Add or replace a file.
    pub fn insert(&mut self, path: impl Into<PathBuf>, data: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), data.into());
    }

    /// Number of handles opened and not yet dropped.
    pub fn open_handles(&self) -> usize {
        self.open_handles.load(Ordering::SeqCst)
    }
}

impl Storage for MemoryStorage {
    type Handle = MemoryHandle;

    fn open(&self, path: &Path, write: bool) -> io::Result<MemoryHandle> {
        if write {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "memory storage is read-only",
            ));
        }
        let fault = self.faults.get(path).copied();
        if fault == Some(Fault::Open) {
            return Err(io::Error::new(io::ErrorKind::Other, "injected open failure"));
        }
        let data = self
            .files
            .get(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))?;

        self.open_handles.fetch_add(1, Ordering::SeqCst);
        trace!("opened memory file {}", path.display());
        Ok(MemoryHandle {
            cursor: Cursor::new(data.clone()),
            fault,
            delivered: 0,
            open_handles: Arc::clone(&self.open_handles),
        })
    }
}

/// Handle returned by [`MemoryStorage`].
#[derive(Debug)]
pub struct MemoryHandle {
    cursor: Cursor<Vec<u8>>,
    fault: Option<Fault>,
    delivered: usize,
    open_handles: Arc<AtomicUsize>,
}

fn injected(what: &str) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("injected {} failure", what))
}

impl Read for MemoryHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let limit = match self.fault {
            Some(Fault::ShortRead(limit)) => limit.saturating_sub(self.delivered),
            _ => buf.len(),
        };
        let n = buf.len().min(limit);
        let read = self.cursor.read(&mut buf[..n])?;
        self.delivered += read;
        Ok(read)
    }
}

impl Seek for MemoryHandle {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match (self.fault, pos) {
            (Some(Fault::SeekEnd), SeekFrom::End(_)) => Err(injected("seek")),
            (Some(Fault::SeekStart), SeekFrom::Start(_)) => Err(injected("seek")),
            (Some(Fault::Tell), SeekFrom::Current(0)) => Err(injected("tell")),
            (Some(Fault::ReportLength(len)), SeekFrom::End(0)) => {
                self.cursor.set_position(len);
                Ok(len)
            }
            _ => self.cursor.seek(pos),
        }
    }
}

impl Drop for MemoryHandle {
    fn drop(&mut self) {
        self.open_handles.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageHandle;

    #[test]
    fn test_handle_count_tracks_drop() {
        let storage = MemoryStorage::new().with_file("a", b"abc".to_vec());
        let handle = storage.open(Path::new("a"), false).unwrap();
        assert_eq!(storage.open_handles(), 1);
        drop(handle);
        assert_eq!(storage.open_handles(), 0);
    }

    #[test]
    fn test_injected_tell_failure() {
        let storage = MemoryStorage::new()
            .with_file("a", b"abc".to_vec())
            .with_fault("a", Fault::Tell);
        let mut handle = storage.open(Path::new("a"), false).unwrap();
        assert!(StorageHandle::seek(&mut handle, SeekFrom::End(0)).is_ok());
        assert!(handle.tell().is_err());
    }

    #[test]
    fn test_short_read_limits_total() {
        let storage = MemoryStorage::new()
            .with_file("a", b"abcdef".to_vec())
            .with_fault("a", Fault::ShortRead(4));
        let mut handle = storage.open(Path::new("a"), false).unwrap();
        let mut buf = [0u8; 6];
        assert_eq!(Read::read(&mut handle, &mut buf).unwrap(), 4);
        assert_eq!(Read::read(&mut handle, &mut buf).unwrap(), 0);
    }

    #[test]
    fn test_write_mode_rejected() {
        let storage = MemoryStorage::new().with_file("a", Vec::new());
        assert!(storage.open(Path::new("a"), true).is_err());
        assert_eq!(storage.open_handles(), 0);
    }
}
