//! Chunk walking: tag + u32 LE length + payload + pad byte for odd lengths.

use crate::error::DecodeError;
use crate::tag::Tag;

/// Size of a chunk header (tag + length).
pub(crate) const CHUNK_HEADER_LEN: usize = 8;

/// A chunk borrowed from the input buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub tag: Tag,
    pub payload: &'a [u8],
    /// Offset of the first payload byte, relative to the span the walker
    /// was created over plus its base offset.
    pub offset: usize,
}

/// Cursor over consecutive chunks in a byte span.
///
/// Cloning is free and restarts nothing; create a new reader over the same
/// span to walk it again.
#[derive(Clone, Debug)]
pub struct ChunkReader<'a> {
    data: &'a [u8],
    pos: usize,
    base: usize,
    failed: bool,
}

impl<'a> ChunkReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_base(data, 0)
    }

    /// Reader whose reported offsets are shifted by `base`, for spans that
    /// start inside a larger buffer.
    pub(crate) fn with_base(data: &'a [u8], base: usize) -> Self {
        Self {
            data,
            pos: 0,
            base,
            failed: false,
        }
    }

    /// Offset of the next unread byte (including the base offset).
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Read the next chunk and advance past it and its pad byte.
    pub fn next_chunk(&mut self) -> Result<Chunk<'a>, DecodeError> {
        let rest = self.remaining();
        if rest.len() < CHUNK_HEADER_LEN {
            return Err(DecodeError::MalformedChunk(alloc::format!(
                "{} bytes left, not enough for a chunk header",
                rest.len()
            )));
        }
        let tag = Tag([rest[0], rest[1], rest[2], rest[3]]);
        let len = u32::from_le_bytes([rest[4], rest[5], rest[6], rest[7]]) as usize;
        let body = &rest[CHUNK_HEADER_LEN..];
        if len > body.len() {
            return Err(DecodeError::MalformedChunk(alloc::format!(
                "chunk {tag} declares {len} bytes, only {} remain",
                body.len()
            )));
        }
        log::trace!("chunk {tag} size {len} at {}", self.offset());

        let chunk = Chunk {
            tag,
            payload: &body[..len],
            offset: self.offset() + CHUNK_HEADER_LEN,
        };
        let mut consumed = CHUNK_HEADER_LEN + len;

        if len % 2 != 0 {
            match body.get(len) {
                None => return Err(DecodeError::chunk("missing padding byte")),
                Some(&0) => consumed += 1,
                Some(_) => return Err(DecodeError::chunk("padding byte is not 0")),
            }
        }

        self.pos += consumed;
        Ok(chunk)
    }
}

impl<'a> Iterator for ChunkReader<'a> {
    type Item = Result<Chunk<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.is_empty() {
            return None;
        }
        let result = self.next_chunk();
        self.failed = result.is_err();
        Some(result)
    }
}

impl core::iter::FusedIterator for ChunkReader<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_track_base_and_pad() {
        let span = [b'A', b'B', b'C', b'D', 1, 0, 0, 0, 7, 0, b'E', b'F', b'G', b'H', 0, 0, 0, 0];
        let mut reader = ChunkReader::with_base(&span, 12);
        assert_eq!(reader.offset(), 12);

        let first = reader.next_chunk().unwrap();
        assert_eq!(first.offset, 20);
        assert_eq!(reader.offset(), 22);

        let second = reader.next().unwrap().unwrap();
        assert_eq!(second.tag, Tag(*b"EFGH"));
        assert_eq!(second.offset, 30);
        assert_eq!(reader.offset(), 30);
        assert!(reader.next().is_none());
    }
}
