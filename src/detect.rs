//! IFF85 format detection.

use crate::error::{Error, Result};
use crate::model::Signature;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// IFF85 header information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IffFormat {
    /// Form type of the outermost container (e.g., `DJVU`, `PM44`)
    pub form_type: Signature,
    /// Whether the file starts with the `AT&T` magic
    pub has_magic: bool,
    /// Length recorded in the outer `FORM` header
    pub form_len: u32,
}

impl std::fmt::Display for IffFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "IFF85 FORM:{}", self.form_type)
    }
}

const MAGIC: &[u8] = b"AT&T";
const FORM: &[u8] = b"FORM";
const HEADER_LEN: usize = 12; // FORM + length + form type

/// Detect IFF85 format from a file path.
///
/// # Returns
/// * `Ok(IffFormat)` if the file has an IFF85 `FORM` header
/// * `Err(Error::Format)` otherwise
///
/// # Example
/// ```no_run
/// use djvuchunk::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("background.iw4").unwrap();
/// println!("form type: {}", format.form_type);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<IffFormat> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut header = Vec::with_capacity(MAGIC.len() + HEADER_LEN);
    BufReader::new(file)
        .take((MAGIC.len() + HEADER_LEN) as u64)
        .read_to_end(&mut header)
        .map_err(|source| Error::Io {
            path: path.to_path_buf(),
            stage: crate::error::IoStage::Read,
            source,
        })?;
    detect_format_from_bytes(&header)
}

/// Detect IFF85 format from the first bytes of a file.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<IffFormat> {
    let (has_magic, body) = match data.strip_prefix(MAGIC) {
        Some(rest) => (true, rest),
        None => (false, data),
    };

    if body.len() < HEADER_LEN {
        return Err(Error::Format("too short for an IFF85 header".into()));
    }
    if !body.starts_with(FORM) {
        return Err(Error::Format("missing FORM header".into()));
    }

    let form_len = u32::from_be_bytes([body[4], body[5], body[6], body[7]]);
    if form_len < 4 {
        return Err(Error::Format(format!("FORM length {} is too short", form_len)));
    }

    Ok(IffFormat {
        form_type: Signature::from([body[8], body[9], body[10], body[11]]),
        has_magic,
        form_len,
    })
}

/// Check if a file is an IFF85 container.
pub fn is_iff<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}

/// Check if bytes start with an IFF85 container header.
pub fn is_iff_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_with_magic() {
        let data = b"AT&TFORM\0\0\0\x10PM44PM44";
        let format = detect_format_from_bytes(data).unwrap();
        assert_eq!(format.form_type, Signature::PM44);
        assert!(format.has_magic);
        assert_eq!(format.form_len, 16);
        assert_eq!(format.to_string(), "IFF85 FORM:PM44");
    }

    #[test]
    fn test_detect_without_magic() {
        let data = b"FORM\0\0\0\x04DJVU";
        let format = detect_format_from_bytes(data).unwrap();
        assert_eq!(format.form_type, Signature::DJVU);
        assert!(!format.has_magic);
    }

    #[test]
    fn test_detect_invalid_format() {
        assert!(matches!(
            detect_format_from_bytes(b"%PDF-1.7 not iff"),
            Err(Error::Format(_))
        ));
        assert!(!is_iff_bytes(b"AT&TINFO\0\0\0\x0aDJVU"));
    }

    #[test]
    fn test_detect_too_short() {
        assert!(detect_format_from_bytes(b"AT&TFORM").is_err());
        assert!(!is_iff_bytes(b""));
    }

    #[test]
    fn test_detect_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bg.iw4");
        std::fs::write(&path, b"AT&TFORM\0\0\0\x04BM44").unwrap();
        assert_eq!(
            detect_format_from_path(&path).unwrap().form_type,
            Signature::BM44
        );
        assert!(!is_iff(dir.path().join("missing")));
    }
}
