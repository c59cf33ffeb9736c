//! Storage backed by the local filesystem.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

use log::trace;

use super::Storage;

/// Opens real files through `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStorage;

impl FileStorage {
    /// Create a new filesystem storage.
    pub fn new() -> Self {
        Self
    }
}

impl Storage for FileStorage {
    type Handle = File;

    fn open(&self, path: &Path, write: bool) -> io::Result<File> {
        trace!("opening {} (write: {})", path.display(), write);
        if write {
            OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)
        } else {
            File::open(path)
        }
    }
}
