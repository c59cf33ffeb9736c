//! Chunk model for IFF85 page containers.
//!
//! A page is a tree of chunks: leaves carry a four-byte signature and a
//! payload, containers carry a form type and an ordered list of children.

mod chunk;
mod info;
mod signature;

pub use chunk::{Chunk, ChunkContainer, Container, RawChunk, MAX_PAYLOAD_LEN};
pub use info::{PageInfo, INFO_CHUNK_LEN};
pub use signature::Signature;
