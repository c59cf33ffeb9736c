//! Leaf and composite chunk types.

use super::Signature;
use crate::error::{Error, Result};

/// Largest payload an IFF85 chunk length field can describe.
pub const MAX_PAYLOAD_LEN: usize = u32::MAX as usize;

/// A chunk is either a leaf payload or a container of child chunks.
///
/// Every chunk exclusively owns its payload or children. Dropping a
/// container drops its whole subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    /// Leaf chunk with a raw payload.
    Raw(RawChunk),
    /// Composite `FORM` chunk.
    Container(Container),
}

impl Chunk {
    /// Leaf id, or form type for a container.
    pub fn signature(&self) -> Signature {
        match self {
            Chunk::Raw(raw) => raw.signature(),
            Chunk::Container(container) => container.form_type(),
        }
    }

    /// Zero-copy view of a leaf payload. Containers have none.
    pub fn raw_payload(&self) -> Option<&[u8]> {
        match self {
            Chunk::Raw(raw) => Some(raw.data()),
            Chunk::Container(_) => None,
        }
    }

    /// Check if this chunk is a container of the given form type.
    pub fn is_container(&self, form_type: Signature) -> bool {
        matches!(self, Chunk::Container(c) if c.is(form_type))
    }

    /// Borrow as a container, if it is one.
    pub fn as_container(&self) -> Option<&Container> {
        match self {
            Chunk::Container(c) => Some(c),
            Chunk::Raw(_) => None,
        }
    }

    /// Convert into a container, if it is one.
    pub fn into_container(self) -> Option<Container> {
        match self {
            Chunk::Container(c) => Some(c),
            Chunk::Raw(_) => None,
        }
    }
}

impl From<RawChunk> for Chunk {
    fn from(raw: RawChunk) -> Self {
        Chunk::Raw(raw)
    }
}

impl From<Container> for Chunk {
    fn from(container: Container) -> Self {
        Chunk::Container(container)
    }
}

// Errors raised while building a payload have no file; name the chunk instead.
fn payload_label(signature: Signature) -> std::path::PathBuf {
    format!("<{} payload>", signature).into()
}

/// A leaf chunk: signature plus an owned payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChunk {
    signature: Signature,
    data: Vec<u8>,
}

impl RawChunk {
    /// Wrap an already owned buffer.
    ///
    /// Fails with [`Error::Size`] if the buffer is too long for a chunk
    /// length field.
    pub fn new(signature: Signature, data: Vec<u8>) -> Result<Self> {
        if data.len() > MAX_PAYLOAD_LEN {
            return Err(Error::Size {
                path: payload_label(signature),
                len: data.len() as u64,
            });
        }
        Ok(Self { signature, data })
    }

    /// Create a leaf holding a copy of `data`.
    ///
    /// The copy is allocated fallibly; memory exhaustion is reported as
    /// [`Error::Allocation`] rather than aborting.
    pub fn from_slice(signature: Signature, data: &[u8]) -> Result<Self> {
        if data.len() > MAX_PAYLOAD_LEN {
            return Err(Error::Size {
                path: payload_label(signature),
                len: data.len() as u64,
            });
        }
        let mut buf = Vec::new();
        buf.try_reserve_exact(data.len())
            .map_err(|_| Error::Allocation {
                path: payload_label(signature),
                len: data.len() as u64,
            })?;
        buf.extend_from_slice(data);
        Ok(Self {
            signature,
            data: buf,
        })
    }

    /// Chunk id.
    pub fn signature(&self) -> Signature {
        self.signature
    }

    /// Payload bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Take the payload out of the chunk.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// A composite `FORM` chunk with ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    form_type: Signature,
    children: Vec<Chunk>,
}

impl Container {
    /// Create an empty container of the given form type.
    pub fn new(form_type: Signature) -> Self {
        Self {
            form_type,
            children: Vec::new(),
        }
    }

    /// Create an empty `FORM:DJVU` page.
    pub fn page() -> Self {
        Self::new(Signature::DJVU)
    }

    /// Form type of the container.
    pub fn form_type(&self) -> Signature {
        self.form_type
    }

    /// Check the container's form type.
    pub fn is(&self, form_type: Signature) -> bool {
        self.form_type == form_type
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Check if the container has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Get the child at `index`.
    pub fn get(&self, index: usize) -> Option<&Chunk> {
        self.children.get(index)
    }

    /// All direct children in stored order.
    pub fn children(&self) -> &[Chunk] {
        &self.children
    }

    /// Append a child at the end.
    pub fn push(&mut self, chunk: impl Into<Chunk>) {
        self.children.push(chunk.into());
    }

    /// Take the children out of the container.
    pub fn into_children(self) -> Vec<Chunk> {
        self.children
    }

    /// Total number of chunks in the subtree, this container excluded.
    pub fn total_chunks(&self) -> usize {
        self.children
            .iter()
            .map(|c| match c {
                Chunk::Raw(_) => 1,
                Chunk::Container(inner) => 1 + inner.total_chunks(),
            })
            .sum()
    }
}

/// Destination for chunks being merged into a page.
///
/// `insert` takes ownership of the chunk. On success the container keeps
/// it; on failure the chunk is dropped before `insert` returns, so the
/// caller never frees it twice.
pub trait ChunkContainer {
    /// Number of direct children.
    fn len(&self) -> usize;

    /// Check if there are no children.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert `chunk` so that it ends up at position `index`.
    fn insert(&mut self, chunk: Chunk, index: usize) -> Result<()>;

    /// Insert `chunk` after the current last child.
    fn append(&mut self, chunk: Chunk) -> Result<()> {
        let index = self.len();
        self.insert(chunk, index)
    }
}

impl ChunkContainer for Container {
    fn len(&self) -> usize {
        self.children.len()
    }

    fn insert(&mut self, chunk: Chunk, index: usize) -> Result<()> {
        if index > self.children.len() {
            return Err(Error::Item {
                index,
                reason: format!(
                    "insert position out of range ({} children)",
                    self.children.len()
                ),
            });
        }
        self.children.insert(index, chunk);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(sig: &[u8; 4], data: &[u8]) -> Chunk {
        RawChunk::from_slice(Signature::new(sig), data).unwrap().into()
    }

    #[test]
    fn test_raw_chunk_copies_payload() {
        let source = vec![1u8, 2, 3];
        let chunk = RawChunk::from_slice(Signature::BG44, &source).unwrap();
        assert_eq!(chunk.data(), &[1, 2, 3]);
        assert_eq!(chunk.len(), 3);
        assert_eq!(chunk.signature(), Signature::BG44);
    }

    #[test]
    fn test_empty_raw_chunk() {
        let chunk = RawChunk::new(Signature::SJBZ, Vec::new()).unwrap();
        assert!(chunk.is_empty());
    }

    #[test]
    fn test_container_insert_in_order() {
        let mut page = Container::page();
        page.append(raw(b"INFO", b"a")).unwrap();
        page.append(raw(b"BG44", b"b")).unwrap();
        page.insert(raw(b"Sjbz", b"c"), 1).unwrap();

        let sigs: Vec<_> = page.children().iter().map(|c| c.signature()).collect();
        assert_eq!(sigs, vec![Signature::INFO, Signature::SJBZ, Signature::BG44]);
    }

    #[test]
    fn test_container_insert_out_of_range() {
        let mut page = Container::page();
        let result = page.insert(raw(b"INFO", b""), 1);
        assert!(matches!(result, Err(Error::Item { index: 1, .. })));
        assert!(page.is_empty());
    }

    #[test]
    fn test_chunk_signature_and_payload() {
        let leaf = raw(b"BG44", b"xyz");
        assert_eq!(leaf.raw_payload(), Some(&b"xyz"[..]));

        let form: Chunk = Container::new(Signature::PM44).into();
        assert_eq!(form.signature(), Signature::PM44);
        assert!(form.raw_payload().is_none());
        assert!(form.is_container(Signature::PM44));
        assert!(!leaf.is_container(Signature::BG44));
    }

    #[test]
    fn test_total_chunks() {
        let mut inner = Container::new(Signature::PM44);
        inner.push(raw(b"PM44", b"1"));
        inner.push(raw(b"PM44", b"2"));
        let mut outer = Container::page();
        outer.push(raw(b"INFO", b""));
        outer.push(inner);
        assert_eq!(outer.len(), 2);
        assert_eq!(outer.total_chunks(), 4);
    }
}
