//! IFF85 serialization of chunk trees.

use std::path::Path;

use log::{debug, error};

use crate::error::{Error, IoStage, Result};
use crate::model::{Chunk, Container, Signature};
use crate::parser::IFF_MAGIC;

/// Serialize a container as a complete IFF85 file, `AT&T` magic included.
pub fn to_iff_bytes(container: &Container) -> Result<Vec<u8>> {
    let total = CHUNK_HEADER_LEN + form_body_len(container)?;
    let mut out = Vec::with_capacity(IFF_MAGIC.len() + total);
    out.extend_from_slice(IFF_MAGIC);
    write_form(&mut out, container)?;
    Ok(out)
}

/// Serialize a container and write it to `path`.
pub fn write_file<P: AsRef<Path>>(container: &Container, path: P) -> Result<()> {
    let path = path.as_ref();
    let bytes = to_iff_bytes(container)?;
    std::fs::write(path, &bytes).map_err(|source| {
        error!("Can't write file \"{}\": {}", path.display(), source);
        Error::Io {
            path: path.to_path_buf(),
            stage: IoStage::Write,
            source,
        }
    })?;
    debug!("wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

const CHUNK_HEADER_LEN: usize = 8;

/// Size of a chunk on disk: header, body and pad byte.
fn encoded_len(chunk: &Chunk) -> Result<usize> {
    let body = match chunk {
        Chunk::Raw(raw) => raw.len(),
        Chunk::Container(form) => form_body_len(form)?,
    };
    Ok(CHUNK_HEADER_LEN + body + (body & 1))
}

/// Form type plus every encoded child.
fn form_body_len(form: &Container) -> Result<usize> {
    let mut len = 4;
    for child in form.children() {
        len += encoded_len(child)?;
    }
    Ok(len)
}

fn length_field(what: impl std::fmt::Display, body: usize) -> Result<[u8; 4]> {
    u32::try_from(body)
        .map(u32::to_be_bytes)
        .map_err(|_| Error::Render(format!("{} is too large ({} bytes)", what, body)))
}

fn write_chunk(out: &mut Vec<u8>, chunk: &Chunk) -> Result<()> {
    match chunk {
        Chunk::Raw(raw) => {
            out.extend_from_slice(raw.signature().as_bytes());
            out.extend_from_slice(&length_field(raw.signature(), raw.len())?);
            out.extend_from_slice(raw.data());
            if raw.len() % 2 == 1 {
                out.push(0);
            }
            Ok(())
        }
        Chunk::Container(form) => write_form(out, form),
    }
}

fn write_form(out: &mut Vec<u8>, form: &Container) -> Result<()> {
    let body = form_body_len(form)?;
    out.extend_from_slice(Signature::FORM.as_bytes());
    out.extend_from_slice(&length_field(
        format_args!("FORM:{}", form.form_type()),
        body,
    )?);
    out.extend_from_slice(form.form_type().as_bytes());
    for child in form.children() {
        write_chunk(out, child)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawChunk;
    use crate::parser::parse_container;

    #[test]
    fn test_layout_with_padding() {
        let mut page = Container::page();
        page.push(RawChunk::from_slice(Signature::SJBZ, b"abc").unwrap());

        let bytes = to_iff_bytes(&page).unwrap();
        let expected: Vec<u8> = [
            &b"AT&T"[..],
            b"FORM",
            &16u32.to_be_bytes(),
            b"DJVU",
            b"Sjbz",
            &3u32.to_be_bytes(),
            b"abc\0",
        ]
        .concat();
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_nested_form_reads_back() {
        let mut inner = Container::new(Signature::PM44);
        inner.push(RawChunk::from_slice(Signature::PM44, b"slice").unwrap());
        let mut page = Container::page();
        page.push(RawChunk::from_slice(Signature::INFO, &[1; 10]).unwrap());
        page.push(inner);

        let bytes = to_iff_bytes(&page).unwrap();
        assert_eq!(parse_container(&bytes).unwrap(), page);
    }

    #[test]
    fn test_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.djvu");
        write_file(&Container::page(), &path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"AT&TFORM\0\0\0\x04DJVU");
    }
}
