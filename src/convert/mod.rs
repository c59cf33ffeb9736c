//! Building page chunks from external files.
//!
//! Two sources are supported:
//!
//! - any file, copied verbatim into a single leaf chunk ([`build_raw_chunk`])
//! - an IW44 image container whose slices are re-tagged and appended to a
//!   page ([`merge_subcontainer`])
//!
//! # Example
//!
//! ```no_run
//! use djvuchunk::convert::{build_raw_chunk, merge_subcontainer, ExtractOptions};
//! use djvuchunk::model::{ChunkContainer, Container, Signature};
//! use djvuchunk::storage::FileStorage;
//! use std::path::Path;
//!
//! fn main() -> djvuchunk::Result<()> {
//!     let mut page = Container::page();
//!     let mask = build_raw_chunk(&FileStorage, Signature::SJBZ, Path::new("mask.jb2"))?;
//!     page.append(mask)?;
//!
//!     let options = ExtractOptions::new().with_max_items(4);
//!     merge_subcontainer(&FileStorage, &mut page, Signature::BG44, Path::new("bg.iw4"), &options)?;
//!     Ok(())
//! }
//! ```

mod options;
mod raw;
mod subcontainer;

pub use options::{ExtractOptions, MergeReport};
pub use raw::build_raw_chunk;
pub use subcontainer::merge_subcontainer;
