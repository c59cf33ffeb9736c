//! Error types for djvuchunk library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::model::Signature;

/// Result type alias for djvuchunk operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Stage of a storage operation that failed after the file was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoStage {
    /// Seeking to the end of the file to learn its length.
    SeekEnd,
    /// Reading the current offset.
    Tell,
    /// Seeking back to the start of the file.
    SeekStart,
    /// Reading the payload.
    Read,
    /// Writing output.
    Write,
}

impl std::fmt::Display for IoStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            IoStage::SeekEnd => "seek to end",
            IoStage::Tell => "tell",
            IoStage::SeekStart => "seek to start",
            IoStage::Read => "read",
            IoStage::Write => "write",
        };
        f.write_str(s)
    }
}

/// Error types that can occur while building chunks.
#[derive(Error, Debug)]
pub enum Error {
    /// The file could not be opened.
    #[error("Can't open file \"{}\": {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A seek, tell or read failed after the file was opened.
    #[error("Can't process file \"{}\" ({stage}): {source}", path.display())]
    Io {
        path: PathBuf,
        stage: IoStage,
        #[source]
        source: io::Error,
    },

    /// The file is larger than an in-memory buffer can hold.
    #[error("File \"{}\" is too large ({len} bytes)", path.display())]
    Size { path: PathBuf, len: u64 },

    /// The payload buffer could not be allocated.
    #[error("Can't allocate {len} bytes for \"{}\"", path.display())]
    Allocation { path: PathBuf, len: u64 },

    /// The data is not a well-formed container.
    #[error("Malformed container: {0}")]
    Format(String),

    /// The container has a different form type than expected.
    #[error("File \"{}\" is not a IFF85 {expected} file (found {found})", path.display())]
    NotContainer {
        path: PathBuf,
        expected: Signature,
        found: Signature,
    },

    /// A single subchunk could not be converted or appended.
    #[error("Can't append chunk {index}: {reason}")]
    Item { index: usize, reason: String },

    /// A chunk signature is not exactly four ASCII bytes.
    #[error("Invalid chunk signature: {0:?}")]
    InvalidSignature(String),

    /// Page parameters contain a non-digit character (strict mode).
    #[error("Invalid page parameters: {0}")]
    InvalidParams(String),

    /// Error during rendering (IFF, JSON).
    #[error("Rendering error: {0}")]
    Render(String),
}

impl Error {
    /// Whether the error is recovered locally by the subchunk copy loop.
    pub fn is_item_error(&self) -> bool {
        matches!(self, Error::Item { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Size {
            path: PathBuf::from("big.bin"),
            len: 42,
        };
        assert_eq!(err.to_string(), "File \"big.bin\" is too large (42 bytes)");

        let err = Error::NotContainer {
            path: PathBuf::from("bg.djvu"),
            expected: Signature::PM44,
            found: Signature::DJVU,
        };
        assert_eq!(
            err.to_string(),
            "File \"bg.djvu\" is not a IFF85 PM44 file (found DJVU)"
        );
    }

    #[test]
    fn test_io_error_names_stage() {
        let err = Error::Io {
            path: PathBuf::from("a.bin"),
            stage: IoStage::Tell,
            source: io::Error::new(io::ErrorKind::Other, "boom"),
        };
        assert!(err.to_string().contains("(tell)"));
        assert!(!err.is_item_error());
    }

    #[test]
    fn test_item_error_is_recoverable() {
        let err = Error::Item {
            index: 3,
            reason: "rejected".into(),
        };
        assert!(err.is_item_error());
    }
}
