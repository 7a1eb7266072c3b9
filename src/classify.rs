//! Bucketing of the chunks in an extended (`VP8X`) file.

use alloc::vec::Vec;

use crate::chunk::{Chunk, ChunkReader};
use crate::error::DecodeError;
use crate::headers::ExtendedHeader;
use crate::tag::ChunkKind;

/// A still image: an optional `ALPH` plane plus a `VP8 ` or `VP8L` bitstream.
///
/// `alpha` is always `None` when `image` is lossless; the lossless format
/// carries its own alpha.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageData<'a> {
    pub alpha: Option<Chunk<'a>>,
    pub image: Chunk<'a>,
}

impl<'a> ImageData<'a> {
    pub(crate) fn new(
        alpha: Option<Chunk<'a>>,
        image: Option<Chunk<'a>>,
    ) -> Result<Self, DecodeError> {
        let Some(image) = image else {
            return Err(DecodeError::inconsistent("missing image data"));
        };
        let alpha = match alpha {
            Some(_) if image.tag.kind() == ChunkKind::Lossless => {
                log::debug!("'VP8L' image should not have an 'ALPH' chunk; ignoring it");
                None
            }
            other => other,
        };
        Ok(Self { alpha, image })
    }

    /// Image data nested in an `ANMF` payload: `[ALPH] (VP8 |VP8L)`.
    pub(crate) fn from_frame_payload(payload: &'a [u8], base: usize) -> Result<Self, DecodeError> {
        let mut chunks = ChunkReader::with_base(payload, base);
        let mut chunk = chunks.next_chunk()?;
        let mut alpha = None;
        if chunk.tag.kind() == ChunkKind::Alpha {
            alpha = Some(chunk);
            chunk = chunks.next_chunk()?;
        }
        let image = matches!(chunk.tag.kind(), ChunkKind::Lossy | ChunkKind::Lossless)
            .then_some(chunk);
        Self::new(alpha, image)
    }

    /// Offset of the first image byte, alpha plane included.
    fn first_offset(&self) -> usize {
        match self.alpha {
            Some(alpha) => alpha.offset.min(self.image.offset),
            None => self.image.offset,
        }
    }
}

/// Chunks of an extended file after validation.
#[derive(Clone, Debug, Default)]
pub(crate) struct ExtendedChunks<'a> {
    pub icc: Option<Chunk<'a>>,
    pub exif: Option<Chunk<'a>>,
    pub xmp: Option<Chunk<'a>>,
    /// Present iff the header has the animation flag.
    pub animation_header: Option<Chunk<'a>>,
    /// Empty unless the header has the animation flag.
    pub frames: Vec<Chunk<'a>>,
    /// The still image; may also be present in an animated file.
    pub image: Option<ImageData<'a>>,
}

/// Walk every chunk after `VP8X` once, keep the first of each kind (all
/// `ANMF` chunks, in order), then apply the cross-chunk rules.
pub(crate) fn classify<'a>(
    chunks: ChunkReader<'a>,
    header: &ExtendedHeader,
) -> Result<ExtendedChunks<'a>, DecodeError> {
    let mut out = ExtendedChunks::default();
    let mut alpha = None;
    let mut image = None;

    fn store<'c>(slot: &mut Option<Chunk<'c>>, chunk: Chunk<'c>) {
        if slot.is_none() {
            *slot = Some(chunk);
        }
    }

    for chunk in chunks {
        let chunk = chunk?;
        match chunk.tag.kind() {
            ChunkKind::IccProfile => store(&mut out.icc, chunk),
            ChunkKind::Alpha => store(&mut alpha, chunk),
            ChunkKind::AnimationHeader => store(&mut out.animation_header, chunk),
            ChunkKind::AnimationFrame => out.frames.push(chunk),
            ChunkKind::Exif => store(&mut out.exif, chunk),
            ChunkKind::Xmp => store(&mut out.xmp, chunk),
            ChunkKind::Lossy | ChunkKind::Lossless => store(&mut image, chunk),
            ChunkKind::Extended | ChunkKind::Unknown => {
                log::trace!("skipping chunk {}", chunk.tag);
            }
        }
    }

    if header.has_animation {
        if out.animation_header.is_none() {
            return Err(DecodeError::inconsistent(
                "header claims animation, but there is no 'ANIM' chunk",
            ));
        }
    } else {
        if out.animation_header.take().is_some() {
            log::debug!("header claims no animation, but 'ANIM' is present; ignoring it");
        }
        if !out.frames.is_empty() {
            log::debug!(
                "header claims no animation, but {} 'ANMF' chunks are present; ignoring them",
                out.frames.len()
            );
            out.frames.clear();
        }
    }

    if image.is_some() || !header.has_animation || out.frames.is_empty() {
        out.image = Some(ImageData::new(alpha, image)?);
    }

    if let Some(icc) = out.icc {
        let after_image = out
            .image
            .as_ref()
            .is_some_and(|data| icc.offset >= data.first_offset());
        let after_frames = out.frames.first().is_some_and(|f| icc.offset >= f.offset);
        if after_image || after_frames {
            return Err(DecodeError::OrderingViolation(
                "'ICCP' chunk is after the image data".into(),
            ));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::Tag;

    fn chunk(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut v = tag.to_vec();
        v.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        v.extend_from_slice(payload);
        if payload.len() % 2 == 1 {
            v.push(0);
        }
        v
    }

    fn animated() -> ExtendedHeader {
        ExtendedHeader {
            has_animation: true,
            ..ExtendedHeader::default()
        }
    }

    #[test]
    fn frame_payload_with_alpha() {
        let payload = [chunk(b"ALPH", &[0, 1, 2]), chunk(b"VP8 ", &[0; 10])].concat();
        let data = ImageData::from_frame_payload(&payload, 100).unwrap();
        assert_eq!(data.alpha.map(|c| c.tag), Some(Tag::ALPH));
        assert_eq!(data.alpha.map(|c| c.offset), Some(108));
        assert_eq!(data.image.tag, Tag::VP8);
        assert_eq!(data.image.offset, 100 + 12 + 8);
        assert_eq!(data.first_offset(), 108);
    }

    #[test]
    fn frames_keep_order_and_still_is_optional() {
        let body = [
            chunk(b"ANIM", &[0; 6]),
            chunk(b"ANMF", &[1; 16]),
            chunk(b"ANMF", &[2; 16]),
        ]
        .concat();
        let out = classify(ChunkReader::new(&body), &animated()).unwrap();
        assert!(out.animation_header.is_some());
        assert_eq!(out.frames.len(), 2);
        assert_eq!(out.frames[0].payload[0], 1);
        assert_eq!(out.frames[1].payload[0], 2);
        assert!(out.image.is_none());
    }

    #[test]
    fn walk_errors_propagate() {
        let mut body = chunk(b"EXIF", &[1]);
        body[9] = 1;
        assert!(matches!(
            classify(ChunkReader::new(&body), &ExtendedHeader::default()),
            Err(DecodeError::MalformedChunk(_))
        ));
    }
}
