//! Merging IW44 slices from a sub-container file into a page.
//!
//! A standalone IW44 image is stored as `FORM:PM44` (or `FORM:BM44`)
//! holding one `PM44` chunk per refinement slice. Inside a page the same
//! slices are stored as `BG44`, `FG44` or `TH44` chunks, so merging is a
//! matter of copying the slice payloads under a new id.

use std::path::Path;

use log::{debug, error, warn};

use super::options::{ExtractOptions, MergeReport};
use crate::error::{Error, Result};
use crate::model::{Chunk, ChunkContainer, RawChunk, Signature};
use crate::parser::read_container;
use crate::storage::{open_for_read, Storage};

/// Copy matching subchunks of the container at `path` into `destination`.
///
/// Subchunks whose id equals `options.subchunk_signature` are copied in
/// source order, re-tagged as `target`, and appended after whatever
/// `destination` already holds. At most `options.max_items` are appended
/// (0 = all of them).
///
/// Failing to open or parse the file, or finding a form type other than
/// `options.container_signature`, aborts before `destination` is touched.
/// A slice that cannot be copied or appended is logged, recorded in the
/// report and skipped; slices appended before it stay in place and it does
/// not count against `max_items`.
///
/// The source file and container are released before this returns.
pub fn merge_subcontainer<S, D>(
    storage: &S,
    destination: &mut D,
    target: Signature,
    path: &Path,
    options: &ExtractOptions,
) -> Result<MergeReport>
where
    S: Storage + ?Sized,
    D: ChunkContainer + ?Sized,
{
    let source = {
        let mut handle = open_for_read(storage, path)?;
        read_container(&mut handle, path)?
    };

    if !source.is(options.container_signature) {
        error!(
            "File \"{}\" is not a IFF85 {} file",
            path.display(),
            options.container_signature
        );
        return Err(Error::NotContainer {
            path: path.to_path_buf(),
            expected: options.container_signature,
            found: source.form_type(),
        });
    }

    let mut remaining = match options.max_items {
        0 => source.len(),
        n => n,
    };
    let mut report = MergeReport::default();

    for (index, subchunk) in source.children().iter().enumerate() {
        if remaining == 0 {
            break;
        }
        if subchunk.signature() != options.subchunk_signature {
            report.skipped += 1;
            continue;
        }

        match append_retagged(destination, subchunk, index, target) {
            Ok(()) => {
                remaining -= 1;
                report.appended += 1;
            }
            Err(e) => {
                warn!("Can't append chunk {}: {}", target, e);
                report.failed.push(e);
            }
        }
    }

    debug!(
        "merged {} {} chunks from {} ({} failed)",
        report.appended,
        target,
        path.display(),
        report.failed.len()
    );
    Ok(report)
}

/// Copy one slice as a `target` chunk and append it.
///
/// If the append is rejected the new chunk is dropped by `insert`.
fn append_retagged<D: ChunkContainer + ?Sized>(
    destination: &mut D,
    subchunk: &Chunk,
    index: usize,
    target: Signature,
) -> Result<()> {
    let payload = subchunk.raw_payload().ok_or_else(|| Error::Item {
        index,
        reason: format!("{} is a container, not a slice", subchunk.signature()),
    })?;

    let chunk = RawChunk::from_slice(target, payload).map_err(|e| Error::Item {
        index,
        reason: e.to_string(),
    })?;

    let at = destination.len();
    destination
        .insert(chunk.into(), at)
        .map_err(|e| Error::Item {
            index,
            reason: e.to_string(),
        })
}
