//! Raw chunks built from whole external files.

use std::path::Path;

use log::{debug, error};

use crate::error::Result;
use crate::model::{Chunk, RawChunk, Signature};
use crate::storage::{open_for_read, read_to_vec, Storage};

/// Read the file at `path` and wrap its bytes as a `signature` chunk.
///
/// The file is closed before this returns, on success and on every
/// failure. On failure no chunk is produced and the buffer, if one was
/// allocated, is released.
///
/// # Errors
///
/// * [`Error::Open`](crate::Error::Open) if the file cannot be opened
/// * [`Error::Io`](crate::Error::Io) if seeking, telling or reading fails,
///   including a short read
/// * [`Error::Size`](crate::Error::Size) if the file is too large for a
///   buffer or a chunk
/// * [`Error::Allocation`](crate::Error::Allocation) if the buffer cannot
///   be allocated
pub fn build_raw_chunk<S: Storage + ?Sized>(
    storage: &S,
    signature: Signature,
    path: &Path,
) -> Result<Chunk> {
    let data = {
        let mut handle = open_for_read(storage, path)?;
        read_to_vec(&mut handle, path)?
    };

    let len = data.len();
    let chunk = RawChunk::new(signature, data).map_err(|e| {
        error!("File \"{}\" is too large", path.display());
        e
    })?;

    debug!("built {} chunk from {} ({} bytes)", signature, path.display(), len);
    Ok(chunk.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, IoStage};
    use crate::storage::{Fault, MemoryStorage};

    const PATH: &str = "mask.jb2";

    fn storage_with(data: &[u8]) -> MemoryStorage {
        MemoryStorage::new().with_file(PATH, data.to_vec())
    }

    #[test]
    fn test_build_raw_chunk() {
        let storage = storage_with(b"jb2 data");
        let chunk = build_raw_chunk(&storage, Signature::SJBZ, Path::new(PATH)).unwrap();
        assert_eq!(chunk.signature(), Signature::SJBZ);
        assert_eq!(chunk.raw_payload(), Some(&b"jb2 data"[..]));
        assert_eq!(storage.open_handles(), 0);
    }

    #[test]
    fn test_build_raw_chunk_empty_file() {
        let storage = storage_with(b"");
        let chunk = build_raw_chunk(&storage, Signature::SJBZ, Path::new(PATH)).unwrap();
        assert_eq!(chunk.raw_payload().map(|p| p.len()), Some(0));
    }

    #[test]
    fn test_missing_file() {
        let storage = MemoryStorage::new();
        let result = build_raw_chunk(&storage, Signature::SJBZ, Path::new(PATH));
        assert!(matches!(result, Err(Error::Open { .. })));
        assert_eq!(storage.open_handles(), 0);
    }

    #[test]
    fn test_each_io_stage_fails_and_closes() {
        let cases = [
            (Fault::SeekEnd, IoStage::SeekEnd),
            (Fault::Tell, IoStage::Tell),
            (Fault::SeekStart, IoStage::SeekStart),
            (Fault::ShortRead(3), IoStage::Read),
        ];
        for (fault, expected) in cases {
            let storage = storage_with(b"0123456789").with_fault(PATH, fault);
            let result = build_raw_chunk(&storage, Signature::SJBZ, Path::new(PATH));
            match result {
                Err(Error::Io { stage, .. }) => assert_eq!(stage, expected),
                other => panic!("expected io error for {:?}, got {:?}", fault, other),
            }
            assert_eq!(storage.open_handles(), 0);
        }
    }

    #[test]
    fn test_unallocatable_length() {
        let storage = storage_with(b"x").with_fault(PATH, Fault::ReportLength(u64::MAX / 2));
        let result = build_raw_chunk(&storage, Signature::SJBZ, Path::new(PATH));
        assert!(matches!(
            result,
            Err(Error::Allocation { .. }) | Err(Error::Size { .. })
        ));
        assert_eq!(storage.open_handles(), 0);
    }
}
