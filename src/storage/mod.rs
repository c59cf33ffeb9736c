//! Storage capability set.
//!
//! The chunk builders never touch `std::fs` directly. They go through a
//! [`Storage`] that opens [`StorageHandle`]s, so they can be exercised
//! against [`MemoryStorage`] with injected faults as well as real files.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::{Fault, MemoryHandle, MemoryStorage};

use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use log::error;

use crate::error::{Error, IoStage, Result};

/// An open file. Dropping the handle closes it.
pub trait StorageHandle {
    /// Read up to `buf.len()` bytes, returning how many were read.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Move the file cursor.
    fn seek(&mut self, pos: SeekFrom) -> io::Result<()>;

    /// Current cursor offset.
    fn tell(&mut self) -> io::Result<u64>;
}

impl<T: Read + Seek> StorageHandle for T {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Read::read(self, buf)
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<()> {
        Seek::seek(self, pos).map(|_| ())
    }

    fn tell(&mut self) -> io::Result<u64> {
        self.stream_position()
    }
}

/// Something that can open files by path.
pub trait Storage {
    /// Handle type produced by [`Storage::open`].
    type Handle: StorageHandle;

    /// Open `path`, read-only unless `write` is set.
    fn open(&self, path: &Path, write: bool) -> io::Result<Self::Handle>;
}

impl<S: Storage + ?Sized> Storage for &S {
    type Handle = S::Handle;

    fn open(&self, path: &Path, write: bool) -> io::Result<Self::Handle> {
        (**self).open(path, write)
    }
}

/// Open `path` read-only, reporting failure as [`Error::Open`].
pub fn open_for_read<S: Storage + ?Sized>(storage: &S, path: &Path) -> Result<S::Handle> {
    storage.open(path, false).map_err(|source| {
        error!("Can't open file \"{}\" for chunk: {}", path.display(), source);
        Error::Open {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Read the whole file behind `handle` into a new buffer.
///
/// Seeks to the end to learn the length, seeks back, allocates exactly
/// that many bytes and reads them. A short read is an error. The buffer is
/// released on every failure path; the handle stays with the caller.
pub fn read_to_vec<H: StorageHandle + ?Sized>(handle: &mut H, path: &Path) -> Result<Vec<u8>> {
    let io_err = |stage: IoStage, source: io::Error| {
        error!(
            "Can't process file \"{}\" ({}): {}",
            path.display(),
            stage,
            source
        );
        Error::Io {
            path: path.to_path_buf(),
            stage,
            source,
        }
    };

    handle
        .seek(SeekFrom::End(0))
        .map_err(|e| io_err(IoStage::SeekEnd, e))?;
    let len = handle.tell().map_err(|e| io_err(IoStage::Tell, e))?;

    let size = usize::try_from(len).map_err(|_| {
        error!("File \"{}\" is too large", path.display());
        Error::Size {
            path: path.to_path_buf(),
            len,
        }
    })?;

    handle
        .seek(SeekFrom::Start(0))
        .map_err(|e| io_err(IoStage::SeekStart, e))?;

    let mut buf = Vec::new();
    buf.try_reserve_exact(size).map_err(|_| {
        error!("File \"{}\" is too large", path.display());
        Error::Allocation {
            path: path.to_path_buf(),
            len,
        }
    })?;
    buf.resize(size, 0);

    let mut filled = 0;
    while filled < size {
        match handle.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(io_err(IoStage::Read, e)),
        }
    }
    if filled != size {
        return Err(io_err(
            IoStage::Read,
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("read {} of {} bytes", filled, size),
            ),
        ));
    }

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_to_vec_cursor() {
        let mut cursor = Cursor::new(vec![1u8, 2, 3, 4]);
        cursor.set_position(2);
        let data = read_to_vec(&mut cursor, Path::new("mem")).unwrap();
        assert_eq!(data, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_read_to_vec_empty() {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        let data = read_to_vec(&mut cursor, Path::new("mem")).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn test_open_for_read_missing() {
        let storage = MemoryStorage::new();
        let result = open_for_read(&storage, Path::new("missing.bin"));
        assert!(matches!(result, Err(Error::Open { .. })));
    }
}
