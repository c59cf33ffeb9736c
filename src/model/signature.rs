//! Four-byte chunk signatures.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A four-byte chunk type tag such as `INFO` or `BG44`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature([u8; 4]);

impl Signature {
    /// Generic composite chunk id.
    pub const FORM: Signature = Signature(*b"FORM");
    /// Single page form type.
    pub const DJVU: Signature = Signature(*b"DJVU");
    /// Page geometry chunk.
    pub const INFO: Signature = Signature(*b"INFO");
    /// Colour IW44 image container and slice id.
    pub const PM44: Signature = Signature(*b"PM44");
    /// Greyscale IW44 image container and slice id.
    pub const BM44: Signature = Signature(*b"BM44");
    /// Background IW44 slice inside a page.
    pub const BG44: Signature = Signature(*b"BG44");
    /// Foreground IW44 slice inside a page.
    pub const FG44: Signature = Signature(*b"FG44");
    /// Thumbnail IW44 slice.
    pub const TH44: Signature = Signature(*b"TH44");
    /// JB2 bilevel mask.
    pub const SJBZ: Signature = Signature(*b"Sjbz");

    /// Create a signature from four raw bytes.
    pub const fn new(bytes: &[u8; 4]) -> Self {
        Self(*bytes)
    }

    /// Raw bytes of the signature.
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl From<[u8; 4]> for Signature {
    fn from(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Signature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 4 || !bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
            return Err(Error::InvalidSignature(s.to_string()));
        }
        Ok(Self([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self)
    }
}
