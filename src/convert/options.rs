//! Options and results for sub-container extraction.

use crate::error::Error;
use crate::model::Signature;

/// Options for copying slices out of an IW44 sub-container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Maximum number of slices to copy (0 = all)
    pub max_items: usize,

    /// Form type the source file must have
    pub container_signature: Signature,

    /// Id of the subchunks to copy
    pub subchunk_signature: Signature,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of slices to copy.
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    /// Set the expected form type of the source file.
    pub fn with_container_signature(mut self, signature: Signature) -> Self {
        self.container_signature = signature;
        self
    }

    /// Set the id of the subchunks to copy.
    pub fn with_subchunk_signature(mut self, signature: Signature) -> Self {
        self.subchunk_signature = signature;
        self
    }

    /// Read slices from a `FORM:BM44` greyscale image instead.
    pub fn greyscale(self) -> Self {
        self.with_container_signature(Signature::BM44)
            .with_subchunk_signature(Signature::BM44)
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_items: 0,
            container_signature: Signature::PM44,
            subchunk_signature: Signature::PM44,
        }
    }
}

/// Outcome of a merge that was not aborted.
#[derive(Debug, Default)]
pub struct MergeReport {
    /// Chunks appended to the destination
    pub appended: usize,

    /// Subchunks passed over because their id did not match
    pub skipped: usize,

    /// Per-item failures, in source order
    pub failed: Vec<Error>,
}

impl MergeReport {
    /// Whether every attempted item made it into the destination.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
