//! Four-character chunk identifiers.

use core::fmt;

/// A 4-byte RIFF chunk identifier (FourCC).
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    pub const RIFF: Tag = Tag(*b"RIFF");
    pub const WEBP: Tag = Tag(*b"WEBP");
    pub const VP8: Tag = Tag(*b"VP8 ");
    pub const VP8L: Tag = Tag(*b"VP8L");
    pub const VP8X: Tag = Tag(*b"VP8X");
    pub const ALPH: Tag = Tag(*b"ALPH");
    pub const ANIM: Tag = Tag(*b"ANIM");
    pub const ANMF: Tag = Tag(*b"ANMF");
    pub const ICCP: Tag = Tag(*b"ICCP");
    pub const EXIF: Tag = Tag(*b"EXIF");
    pub const XMP: Tag = Tag(*b"XMP ");

    /// Read a tag from the first four bytes of `bytes`.
    pub(crate) fn from_slice(bytes: &[u8]) -> Option<Tag> {
        let cc: [u8; 4] = bytes.get(..4)?.try_into().ok()?;
        Some(Tag(cc))
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Classify into the closed set of chunk kinds the decoder acts on.
    pub fn kind(self) -> ChunkKind {
        match &self.0 {
            b"VP8 " => ChunkKind::Lossy,
            b"VP8L" => ChunkKind::Lossless,
            b"VP8X" => ChunkKind::Extended,
            b"ALPH" => ChunkKind::Alpha,
            b"ANIM" => ChunkKind::AnimationHeader,
            b"ANMF" => ChunkKind::AnimationFrame,
            b"ICCP" => ChunkKind::IccProfile,
            b"EXIF" => ChunkKind::Exif,
            b"XMP " => ChunkKind::Xmp,
            _ => ChunkKind::Unknown,
        }
    }
}

/// Chunk kinds recognised inside a WebP container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChunkKind {
    /// `VP8 ` lossy bitstream.
    Lossy,
    /// `VP8L` lossless bitstream.
    Lossless,
    /// `VP8X` extended header.
    Extended,
    /// `ALPH` separate alpha channel.
    Alpha,
    /// `ANIM` global animation parameters.
    AnimationHeader,
    /// `ANMF` one animation frame.
    AnimationFrame,
    IccProfile,
    Exif,
    Xmp,
    /// Anything else; skipped.
    Unknown,
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'")?;
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        write!(f, "'")
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_cover_known_tags() {
        assert_eq!(Tag::VP8.kind(), ChunkKind::Lossy);
        assert_eq!(Tag::VP8L.kind(), ChunkKind::Lossless);
        assert_eq!(Tag::XMP.kind(), ChunkKind::Xmp);
        assert_eq!(Tag(*b"vp8 ").kind(), ChunkKind::Unknown);
    }

    #[test]
    fn debug_escapes_binary() {
        let s = alloc::format!("{:?}", Tag([b'A', 0, b'B', b' ']));
        assert_eq!(s, "'A\\x00B '");
    }
}
