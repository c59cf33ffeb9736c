//! Page geometry record and its `INFO` chunk encoding.

use super::{Chunk, RawChunk, Signature};
use crate::error::{Error, Result};
use crate::parser::{parse_params, parse_params_with_mode, ParamMode};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Encoded size of an `INFO` chunk payload.
pub const INFO_CHUNK_LEN: usize = 10;

const INFO_MINOR_VERSION: u8 = 26;
const INFO_MAJOR_VERSION: u8 = 0;

/// Page geometry and display metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Resolution in dots per inch
    pub dpi: u32,

    /// Rotation flag (1 = unrotated)
    pub rotation: u32,

    /// Gamma scaled by 10 (22 = 2.2)
    pub gamma: u32,
}

impl PageInfo {
    /// Default rotation flag.
    pub const DEFAULT_ROTATION: u32 = 1;

    /// Default gamma (2.2).
    pub const DEFAULT_GAMMA: u32 = 22;

    /// Create page info with default rotation and gamma.
    pub fn new(width: u32, height: u32, dpi: u32) -> Self {
        Self {
            width,
            height,
            dpi,
            rotation: Self::DEFAULT_ROTATION,
            gamma: Self::DEFAULT_GAMMA,
        }
    }

    /// Parse `width,height,dpi,rotation,gamma`.
    ///
    /// Never fails. Characters other than digits are folded into the value
    /// the way existing command lines expect; see [`ParamMode::Lenient`].
    pub fn parse(params: &str) -> Self {
        parse_params(params)
    }

    /// Parse with an explicit mode.
    pub fn parse_with_mode(params: &str, mode: ParamMode) -> Result<Self> {
        parse_params_with_mode(params, mode)
    }

    /// Set rotation flag.
    pub fn with_rotation(mut self, rotation: u32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set gamma.
    pub fn with_gamma(mut self, gamma: u32) -> Self {
        self.gamma = gamma;
        self
    }

    /// Encode the 10-byte `INFO` payload.
    ///
    /// Width, height and dpi are 16-bit on the wire, gamma and rotation
    /// are 8-bit; larger values are rejected.
    pub fn encode(&self) -> Result<[u8; INFO_CHUNK_LEN]> {
        let width = narrow_u16("width", self.width)?;
        let height = narrow_u16("height", self.height)?;
        let dpi = narrow_u16("dpi", self.dpi)?;
        let gamma = narrow_u8("gamma", self.gamma)?;
        let rotation = narrow_u8("rotation", self.rotation)?;

        let mut buf = [0u8; INFO_CHUNK_LEN];
        buf[0..2].copy_from_slice(&width.to_be_bytes());
        buf[2..4].copy_from_slice(&height.to_be_bytes());
        buf[4] = INFO_MINOR_VERSION;
        buf[5] = INFO_MAJOR_VERSION;
        // dpi is little-endian, unlike the other fields
        buf[6..8].copy_from_slice(&dpi.to_le_bytes());
        buf[8] = gamma;
        buf[9] = rotation;
        Ok(buf)
    }

    /// Decode an `INFO` payload.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < INFO_CHUNK_LEN {
            return Err(Error::Format(format!(
                "INFO chunk is {} bytes, expected {}",
                data.len(),
                INFO_CHUNK_LEN
            )));
        }
        Ok(Self {
            width: u16::from_be_bytes([data[0], data[1]]) as u32,
            height: u16::from_be_bytes([data[2], data[3]]) as u32,
            dpi: u16::from_le_bytes([data[6], data[7]]) as u32,
            gamma: data[8] as u32,
            rotation: (data[9] & 0x07) as u32,
        })
    }

    /// Build an `INFO` leaf chunk from this record.
    pub fn to_chunk(&self) -> Result<Chunk> {
        let payload = self.encode()?;
        Ok(RawChunk::new(Signature::INFO, payload.to_vec())?.into())
    }
}

impl Default for PageInfo {
    fn default() -> Self {
        Self::new(0, 0, 0)
    }
}

/// Strict parsing: any non-digit character is an error.
impl FromStr for PageInfo {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_params_with_mode(s, ParamMode::Strict)
    }
}

fn narrow_u16(field: &str, value: u32) -> Result<u16> {
    u16::try_from(value)
        .map_err(|_| Error::Format(format!("{} {} does not fit INFO chunk", field, value)))
}

fn narrow_u8(field: &str, value: u32) -> Result<u8> {
    u8::try_from(value)
        .map_err(|_| Error::Format(format!("{} {} does not fit INFO chunk", field, value)))
}
