//! Rendering of chunk trees to IFF85 files and JSON summaries.

mod iff;
mod json;

pub use iff::{to_iff_bytes, write_file};
pub use json::{to_json, ChunkSummary, JsonFormat};
