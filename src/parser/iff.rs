//! IFF85 container reader.
//!
//! Layout: an optional `AT&T` magic, then a `FORM` chunk. Every chunk is a
//! four-byte id, a big-endian `u32` length and the payload, padded to an
//! even length. A `FORM` payload starts with its form type followed by
//! child chunks.

use std::path::Path;

use log::{debug, error};

use crate::error::{Error, Result};
use crate::model::{Chunk, Container, RawChunk, Signature};
use crate::storage::{read_to_vec, StorageHandle};

/// Magic prefix written before the outermost `FORM`.
pub const IFF_MAGIC: &[u8; 4] = b"AT&T";

const CHUNK_HEADER_LEN: usize = 8;
const MAX_NESTING: usize = 32;

/// Read a whole container from an open handle.
///
/// The handle is left open; it belongs to the caller.
pub fn read_container<H: StorageHandle + ?Sized>(handle: &mut H, path: &Path) -> Result<Container> {
    let data = read_to_vec(handle, path)?;
    parse_container(&data).map_err(|e| {
        error!("Can't open file \"{}\" for chunk: {}", path.display(), e);
        e
    })
}

/// Parse a container from bytes.
pub fn parse_container(data: &[u8]) -> Result<Container> {
    let body = data.strip_prefix(IFF_MAGIC.as_slice()).unwrap_or(data);

    let (id, payload, consumed) = read_chunk_header(body, 0)?;
    if id != Signature::FORM {
        return Err(Error::Format(format!("expected FORM, found {}", id)));
    }
    if consumed < body.len() {
        debug!("ignoring {} bytes after outer FORM", body.len() - consumed);
    }

    parse_form(payload, 0)
}

/// Split one chunk off the front of `data[pos..]`.
///
/// Returns the id, the payload and the position just past the chunk
/// including its pad byte (clamped to the end of `data`).
fn read_chunk_header(data: &[u8], pos: usize) -> Result<(Signature, &[u8], usize)> {
    let header = data
        .get(pos..pos + CHUNK_HEADER_LEN)
        .ok_or_else(|| Error::Format(format!("truncated chunk header at offset {}", pos)))?;

    let id = Signature::from([header[0], header[1], header[2], header[3]]);
    let len = u32::from_be_bytes([header[4], header[5], header[6], header[7]]) as usize;

    let start = pos + CHUNK_HEADER_LEN;
    let payload = start
        .checked_add(len)
        .and_then(|end| data.get(start..end))
        .ok_or_else(|| {
            Error::Format(format!(
                "chunk {} at offset {} claims {} bytes, only {} available",
                id,
                pos,
                len,
                data.len().saturating_sub(start)
            ))
        })?;

    let next = (start + len + (len & 1)).min(data.len());
    Ok((id, payload, next))
}

fn parse_form(payload: &[u8], depth: usize) -> Result<Container> {
    if depth >= MAX_NESTING {
        return Err(Error::Format("FORM nesting is too deep".into()));
    }
    let form_type = payload
        .get(0..4)
        .map(|t| Signature::from([t[0], t[1], t[2], t[3]]))
        .ok_or_else(|| Error::Format("FORM is missing its type".into()))?;

    let mut container = Container::new(form_type);
    let children = &payload[4..];
    let mut pos = 0;

    while pos < children.len() {
        let (id, data, next) = read_chunk_header(children, pos)?;
        let chunk: Chunk = if id == Signature::FORM {
            parse_form(data, depth + 1)?.into()
        } else {
            RawChunk::new(id, data.to_vec())?.into()
        };
        container.push(chunk);
        pos = next;
    }

    Ok(container)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn chunk(id: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = id.to_vec();
        out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        out.extend_from_slice(payload);
        if payload.len() % 2 == 1 {
            out.push(0);
        }
        out
    }

    fn form(form_type: &[u8; 4], children: &[Vec<u8>]) -> Vec<u8> {
        let mut payload = form_type.to_vec();
        for c in children {
            payload.extend_from_slice(c);
        }
        chunk(b"FORM", &payload)
    }

    fn with_magic(body: Vec<u8>) -> Vec<u8> {
        let mut out = IFF_MAGIC.to_vec();
        out.extend(body);
        out
    }

    #[test]
    fn test_parse_pm44() {
        let data = with_magic(form(
            b"PM44",
            &[chunk(b"PM44", b"abc"), chunk(b"PM44", b"defg")],
        ));
        let container = parse_container(&data).unwrap();
        assert!(container.is(Signature::PM44));
        assert_eq!(container.len(), 2);
        assert_eq!(container.get(0).unwrap().raw_payload(), Some(&b"abc"[..]));
        assert_eq!(container.get(1).unwrap().raw_payload(), Some(&b"defg"[..]));
    }

    #[test]
    fn test_parse_without_magic() {
        let data = form(b"BM44", &[chunk(b"BM44", b"x")]);
        let container = parse_container(&data).unwrap();
        assert!(container.is(Signature::BM44));
        assert_eq!(container.len(), 1);
    }

    #[test]
    fn test_parse_nested_form() {
        let inner = form(b"PM44", &[chunk(b"PM44", b"1")]);
        let data = with_magic(form(b"DJVU", &[chunk(b"INFO", &[0; 10]), inner]));
        let container = parse_container(&data).unwrap();
        assert_eq!(container.len(), 2);
        assert!(container.get(1).unwrap().is_container(Signature::PM44));
        assert_eq!(container.total_chunks(), 3);
    }

    #[test]
    fn test_missing_final_pad_tolerated() {
        let mut data = form(b"PM44", &[chunk(b"PM44", b"abc")]);
        data.pop();
        // fix up the FORM length to exclude the pad byte
        let len = (data.len() - 8) as u32;
        data[4..8].copy_from_slice(&len.to_be_bytes());
        let container = parse_container(&data).unwrap();
        assert_eq!(container.get(0).unwrap().raw_payload(), Some(&b"abc"[..]));
    }

    #[test]
    fn test_not_a_form() {
        let data = with_magic(chunk(b"INFO", &[0; 10]));
        assert!(matches!(parse_container(&data), Err(Error::Format(_))));
    }

    #[test]
    fn test_truncated_payload() {
        let mut data = with_magic(form(b"PM44", &[chunk(b"PM44", b"abcdef")]));
        data.truncate(data.len() - 3);
        assert!(matches!(parse_container(&data), Err(Error::Format(_))));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_container(&[]).is_err());
        assert!(parse_container(IFF_MAGIC).is_err());
    }

    #[test]
    fn test_read_container_from_handle() {
        let data = with_magic(form(b"PM44", &[chunk(b"PM44", b"zz")]));
        let mut cursor = Cursor::new(data);
        let container = read_container(&mut cursor, Path::new("mem.djvu")).unwrap();
        assert_eq!(container.len(), 1);
    }
}
