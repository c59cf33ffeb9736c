//! # djvuchunk
//!
//! Build the chunks of a DjVu page from external sources.
//!
//! A DjVu page is an IFF85 `FORM:DJVU` container. This library fills one
//! from three kinds of input:
//!
//! - a `width,height,dpi,rotation,gamma` parameter string, turned into an
//!   `INFO` chunk
//! - any file, wrapped verbatim as a chunk with a chosen id (`Sjbz`,
//!   `FGbz`, ...)
//! - an IW44 image file (`FORM:PM44` or `FORM:BM44`), whose slices are
//!   re-tagged as `BG44`, `FG44` or `TH44` and appended to the page
//!
//! ## Quick Start
//!
//! ```no_run
//! use djvuchunk::{render, PageBuilder, Signature};
//!
//! fn main() -> djvuchunk::Result<()> {
//!     let page = PageBuilder::new()
//!         .info("2550,3300,300")?
//!         .raw_chunk(Signature::SJBZ, "mask.jb2")?
//!         .iw44(Signature::BG44, "background.iw4", 0)?
//!         .build();
//!
//!     render::write_file(&page, "page.djvu")?;
//!     Ok(())
//! }
//! ```
//!
//! All file access goes through the [`storage::Storage`] trait, so every
//! builder can also run against [`storage::MemoryStorage`].

pub mod convert;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;
pub mod storage;

// Re-export commonly used types
pub use convert::{build_raw_chunk, merge_subcontainer, ExtractOptions, MergeReport};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_iff, IffFormat};
pub use error::{Error, IoStage, Result};
pub use model::{Chunk, ChunkContainer, Container, PageInfo, RawChunk, Signature};
pub use parser::{parse_params, ParamMode};
pub use render::{to_iff_bytes, to_json, ChunkSummary, JsonFormat};
pub use storage::{FileStorage, MemoryStorage, Storage};

use std::path::Path;

use log::debug;

/// Create an `INFO` chunk from a `width,height,dpi,rotation,gamma` string.
///
/// Parsing never fails; the chunk fails only if a value does not fit its
/// on-wire field.
///
/// # Example
///
/// ```
/// let chunk = djvuchunk::create_info_chunk("100,200,300").unwrap();
/// assert_eq!(chunk.signature(), djvuchunk::Signature::INFO);
/// ```
pub fn create_info_chunk(params: &str) -> Result<Chunk> {
    PageInfo::parse(params).to_chunk()
}

/// Wrap the contents of a file as a chunk with the given id.
///
/// # Example
///
/// ```no_run
/// use djvuchunk::{create_raw_chunk_from_file, Signature};
///
/// let mask = create_raw_chunk_from_file(Signature::SJBZ, "mask.jb2").unwrap();
/// ```
pub fn create_raw_chunk_from_file<P: AsRef<Path>>(signature: Signature, path: P) -> Result<Chunk> {
    build_raw_chunk(&FileStorage, signature, path.as_ref())
}

/// Append up to `max_items` slices of an IW44 file to `page` (0 = all).
///
/// # Example
///
/// ```no_run
/// use djvuchunk::{merge_iw44_chunks_from_file, Container, Signature};
///
/// let mut page = Container::page();
/// let report = merge_iw44_chunks_from_file(&mut page, Signature::BG44, "bg.iw4", 3).unwrap();
/// println!("{} slices merged", report.appended);
/// ```
pub fn merge_iw44_chunks_from_file<D, P>(
    page: &mut D,
    signature: Signature,
    path: P,
    max_items: usize,
) -> Result<MergeReport>
where
    D: ChunkContainer + ?Sized,
    P: AsRef<Path>,
{
    let options = ExtractOptions::new().with_max_items(max_items);
    merge_subcontainer(&FileStorage, page, signature, path.as_ref(), &options)
}

/// Read an IFF85 file into a container.
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Container> {
    let path = path.as_ref();
    let mut handle = storage::open_for_read(&FileStorage, path)?;
    parser::read_container(&mut handle, path)
}

/// Builder for assembling a single page.
///
/// Chunks are appended in the order the builder methods are called.
///
/// # Example
///
/// ```no_run
/// use djvuchunk::{PageBuilder, Signature};
///
/// let page = PageBuilder::new()
///     .info("2550,3300,300,1,22")?
///     .iw44(Signature::BG44, "background.iw4", 4)?
///     .build();
/// # Ok::<(), djvuchunk::Error>(())
/// ```
pub struct PageBuilder<S: Storage = FileStorage> {
    storage: S,
    page: Container,
    param_mode: ParamMode,
}

impl PageBuilder<FileStorage> {
    /// Create a builder reading from the filesystem.
    pub fn new() -> Self {
        Self::with_storage(FileStorage)
    }
}

impl Default for PageBuilder<FileStorage> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Storage> PageBuilder<S> {
    /// Create a builder reading through `storage`.
    pub fn with_storage(storage: S) -> Self {
        Self {
            storage,
            page: Container::page(),
            param_mode: ParamMode::default(),
        }
    }

    /// Reject non-digit characters in parameter strings.
    pub fn strict_params(mut self) -> Self {
        self.param_mode = ParamMode::Strict;
        self
    }

    /// Append an `INFO` chunk parsed from a parameter string.
    pub fn info(self, params: &str) -> Result<Self> {
        let info = PageInfo::parse_with_mode(params, self.param_mode)?;
        self.page_info(info)
    }

    /// Append an `INFO` chunk.
    pub fn page_info(mut self, info: PageInfo) -> Result<Self> {
        self.page.append(info.to_chunk()?)?;
        Ok(self)
    }

    /// Append a file verbatim as a `signature` chunk.
    pub fn raw_chunk(mut self, signature: Signature, path: impl AsRef<Path>) -> Result<Self> {
        let chunk = build_raw_chunk(&self.storage, signature, path.as_ref())?;
        self.page.append(chunk)?;
        Ok(self)
    }

    /// Append up to `max_items` IW44 slices as `signature` chunks (0 = all).
    pub fn iw44(self, signature: Signature, path: impl AsRef<Path>, max_items: usize) -> Result<Self> {
        let options = ExtractOptions::new().with_max_items(max_items);
        self.iw44_with_options(signature, path, &options)
    }

    /// Append IW44 slices with explicit extract options.
    pub fn iw44_with_options(
        mut self,
        signature: Signature,
        path: impl AsRef<Path>,
        options: &ExtractOptions,
    ) -> Result<Self> {
        let report =
            merge_subcontainer(&self.storage, &mut self.page, signature, path.as_ref(), options)?;
        if !report.is_complete() {
            debug!("{} slices could not be merged", report.failed.len());
        }
        Ok(self)
    }

    /// Append an already built chunk.
    pub fn chunk(mut self, chunk: impl Into<Chunk>) -> Result<Self> {
        self.page.append(chunk.into())?;
        Ok(self)
    }

    /// The page assembled so far.
    pub fn page(&self) -> &Container {
        &self.page
    }

    /// Finish and return the page.
    pub fn build(self) -> Container {
        self.page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pm44_file(slices: &[&str]) -> Vec<u8> {
        let mut form = Container::new(Signature::PM44);
        for s in slices {
            form.push(RawChunk::from_slice(Signature::PM44, s.as_bytes()).unwrap());
        }
        to_iff_bytes(&form).unwrap()
    }

    #[test]
    fn test_create_info_chunk() {
        let chunk = create_info_chunk("100,200,300,2,10").unwrap();
        let info = PageInfo::decode(chunk.raw_payload().unwrap()).unwrap();
        assert_eq!(info, PageInfo::new(100, 200, 300).with_rotation(2).with_gamma(10));
    }

    #[test]
    fn test_page_builder_order() {
        let storage = MemoryStorage::new()
            .with_file("mask.jb2", b"jb2".to_vec())
            .with_file("bg.iw4", pm44_file(&["a", "b", "c"]));

        let page = PageBuilder::with_storage(&storage)
            .info("100,200,300")
            .unwrap()
            .raw_chunk(Signature::SJBZ, "mask.jb2")
            .unwrap()
            .iw44(Signature::BG44, "bg.iw4", 2)
            .unwrap()
            .build();

        let ids: Vec<_> = page.children().iter().map(|c| c.signature()).collect();
        assert_eq!(
            ids,
            vec![Signature::INFO, Signature::SJBZ, Signature::BG44, Signature::BG44]
        );
        assert_eq!(storage.open_handles(), 0);
    }

    #[test]
    fn test_page_builder_strict_params() {
        let result = PageBuilder::with_storage(MemoryStorage::new())
            .strict_params()
            .info("1x0,200");
        assert!(matches!(result, Err(Error::InvalidParams(_))));
    }

    #[test]
    fn test_page_builder_missing_file() {
        let result = PageBuilder::with_storage(MemoryStorage::new())
            .raw_chunk(Signature::SJBZ, "missing.jb2");
        assert!(matches!(result, Err(Error::Open { .. })));
    }

    #[test]
    fn test_page_builder_default_is_empty_page() {
        let builder: PageBuilder = PageBuilder::default();
        assert!(builder.page().is(Signature::DJVU));
        assert!(builder.page().is_empty());
    }
}
