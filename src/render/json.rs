//! JSON summaries of chunk trees.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{Chunk, Container, PageInfo, Signature};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Structure of one chunk, without its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkSummary {
    /// Chunk id (`FORM` for containers)
    pub id: String,

    /// Form type, for containers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_type: Option<String>,

    /// Payload size in bytes, for leaves
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,

    /// Decoded page geometry, for `INFO` chunks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<PageInfo>,

    /// Children, for containers
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ChunkSummary>,
}

impl ChunkSummary {
    /// Summarize a chunk and its subtree.
    pub fn of(chunk: &Chunk) -> Self {
        match chunk {
            Chunk::Raw(raw) => Self {
                id: raw.signature().to_string(),
                form_type: None,
                size: Some(raw.len()),
                info: (raw.signature() == Signature::INFO)
                    .then(|| PageInfo::decode(raw.data()).ok())
                    .flatten(),
                children: Vec::new(),
            },
            Chunk::Container(form) => Self::of_container(form),
        }
    }

    /// Summarize a container and its subtree.
    pub fn of_container(form: &Container) -> Self {
        Self {
            id: Signature::FORM.to_string(),
            form_type: Some(form.form_type().to_string()),
            size: None,
            info: None,
            children: form.children().iter().map(Self::of).collect(),
        }
    }
}

/// Convert a container's structure to JSON.
pub fn to_json(container: &Container, format: JsonFormat) -> Result<String> {
    let summary = ChunkSummary::of_container(container);
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(&summary),
        JsonFormat::Compact => serde_json::to_string(&summary),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}
