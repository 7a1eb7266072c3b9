//! Field-level decoders for the fixed-layout chunk headers.
//!
//! Every header is unpacked byte by byte; nothing is overlaid on the input.

use crate::error::DecodeError;

/// Read a 24-bit little-endian value from `b[0..3]`.
#[inline]
pub(crate) fn read_u24_le(b: &[u8]) -> u32 {
    u32::from(b[0]) | (u32::from(b[1]) << 8) | (u32::from(b[2]) << 16)
}

#[inline]
fn read_u16_le(b: &[u8]) -> u16 {
    u16::from_le_bytes([b[0], b[1]])
}

#[inline]
fn read_u32_le(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

// ── VP8 (lossy) ─────────────────────────────────────────────────────

/// Start code following the frame tag of every lossy key frame.
const VP8_START_CODE: [u8; 3] = [0x9d, 0x01, 0x2a];

/// The uncompressed data chunk at the start of a lossy key frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LossyHeader {
    pub is_key_frame: bool,
    /// 0..=7
    pub version: u8,
    pub show_frame: bool,
    pub first_partition_size: u32,
    /// Low 14 bits of the width field.
    pub width: u16,
    /// 0..=3, display-time upscaling only.
    pub h_scale: u8,
    pub height: u16,
    pub v_scale: u8,
}

impl LossyHeader {
    pub(crate) fn parse(payload: &[u8]) -> Result<Self, DecodeError> {
        if payload.len() < 10 {
            return Err(DecodeError::chunk("'VP8 ' chunk too small"));
        }

        let frame_tag = read_u24_le(&payload[0..3]);
        let is_key_frame = frame_tag & 1 == 0;
        let version = ((frame_tag >> 1) & 0x7) as u8;
        let show_frame = frame_tag & 0x10 != 0;
        let first_partition_size = frame_tag >> 5;

        if !is_key_frame {
            return Err(DecodeError::unsupported("'VP8 ' chunk is not a key frame"));
        }
        if !show_frame {
            // accepted; lossy pixels are never produced
            log::debug!("'VP8 ' key frame has show_frame unset");
        }
        if payload[3..6] != VP8_START_CODE {
            return Err(DecodeError::chunk("'VP8 ' chunk has an invalid start code"));
        }

        let w = read_u16_le(&payload[6..8]);
        let h = read_u16_le(&payload[8..10]);
        let header = LossyHeader {
            is_key_frame,
            version,
            show_frame,
            first_partition_size,
            width: w & 0x3fff,
            h_scale: (w >> 14) as u8,
            height: h & 0x3fff,
            v_scale: (h >> 14) as u8,
        };
        log::debug!("{header:?}");
        Ok(header)
    }
}

// ── VP8L (lossless) ─────────────────────────────────────────────────

const VP8L_SIGNATURE: u8 = 0x2f;

/// The 5-byte header at the start of a lossless bitstream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LosslessHeader {
    pub width: u32,
    pub height: u32,
    pub alpha_is_used: bool,
}

impl LosslessHeader {
    /// Parse the header; returns it along with the bitstream that follows.
    pub(crate) fn parse(payload: &[u8]) -> Result<(Self, &[u8]), DecodeError> {
        if payload.len() < 5 {
            return Err(DecodeError::chunk("'VP8L' chunk too small"));
        }
        if payload[0] != VP8L_SIGNATURE {
            return Err(DecodeError::chunk("'VP8L' chunk has an invalid signature"));
        }

        let bits = read_u32_le(&payload[1..5]);
        let version = bits >> 29;
        if version != 0 {
            return Err(DecodeError::UnsupportedFeature(alloc::format!(
                "'VP8L' version {version}"
            )));
        }
        let header = LosslessHeader {
            width: (bits & 0x3fff) + 1,
            height: ((bits >> 14) & 0x3fff) + 1,
            alpha_is_used: (bits >> 28) & 1 != 0,
        };
        log::debug!("{header:?}");
        Ok((header, &payload[5..]))
    }
}

// ── VP8X (extended) ─────────────────────────────────────────────────

/// Feature flags and canvas size of an extended file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExtendedHeader {
    pub has_icc: bool,
    pub has_alpha: bool,
    pub has_exif: bool,
    pub has_xmp: bool,
    pub has_animation: bool,
    pub canvas_width: u32,
    pub canvas_height: u32,
}

impl ExtendedHeader {
    pub(crate) fn parse(payload: &[u8]) -> Result<Self, DecodeError> {
        if payload.len() < 10 {
            return Err(DecodeError::chunk("'VP8X' chunk too small"));
        }

        // Rsv:2 I:1 L:1 E:1 X:1 A:1 R:1, then 3 reserved bytes
        let flags = payload[0];
        let header = ExtendedHeader {
            has_icc: flags & 0x20 != 0,
            has_alpha: flags & 0x10 != 0,
            has_exif: flags & 0x08 != 0,
            has_xmp: flags & 0x04 != 0,
            has_animation: flags & 0x02 != 0,
            canvas_width: read_u24_le(&payload[4..7]) + 1,
            canvas_height: read_u24_le(&payload[7..10]) + 1,
        };
        log::debug!("flags {flags:#04x}, {header:?}");
        Ok(header)
    }
}

// ── ANIM ────────────────────────────────────────────────────────────

/// Global animation parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnimationHeader {
    /// ARGB, alpha in the top byte.
    pub background_color: u32,
    /// 0 means loop forever.
    pub loop_count: u16,
}

impl AnimationHeader {
    pub(crate) fn parse(payload: &[u8]) -> Result<Self, DecodeError> {
        if payload.len() < 6 {
            return Err(DecodeError::chunk("'ANIM' chunk too small"));
        }
        let header = AnimationHeader {
            background_color: read_u32_le(&payload[0..4]),
            loop_count: read_u16_le(&payload[4..6]),
        };
        log::debug!(
            "background_color {:#010x} loop_count {}",
            header.background_color,
            header.loop_count
        );
        Ok(header)
    }
}

// ── ANMF ────────────────────────────────────────────────────────────

/// How a frame is combined with the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendMethod {
    /// Source-over alpha compositing.
    AlphaBlend,
    /// Replace canvas pixels, source alpha included.
    Overwrite,
}

/// What happens to a frame's rectangle before the next frame is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisposeMethod {
    None,
    ToBackground,
}

/// Header of one `ANMF` chunk. Coordinates are canvas-relative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameHeader<'a> {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub duration_ms: u32,
    pub blend: BlendMethod,
    pub dispose: DisposeMethod,
    /// Nested chunks carrying this frame's image data.
    pub payload: &'a [u8],
}

impl<'a> FrameHeader<'a> {
    pub(crate) fn parse(
        payload: &'a [u8],
        canvas_width: u32,
        canvas_height: u32,
    ) -> Result<Self, DecodeError> {
        if payload.len() < 16 {
            return Err(DecodeError::chunk("'ANMF' chunk too small"));
        }

        // offsets are stored in 2-pixel units
        let x = read_u24_le(&payload[0..3]) * 2;
        let y = read_u24_le(&payload[3..6]) * 2;
        let width = read_u24_le(&payload[6..9]) + 1;
        let height = read_u24_le(&payload[9..12]) + 1;
        let duration_ms = read_u24_le(&payload[12..15]);
        let flags = payload[15];
        let blend = if flags & 0x02 == 0 {
            BlendMethod::AlphaBlend
        } else {
            BlendMethod::Overwrite
        };
        let dispose = if flags & 0x01 == 0 {
            DisposeMethod::None
        } else {
            DisposeMethod::ToBackground
        };

        log::debug!(
            "frame at ({x}, {y}) size {width}x{height} duration {duration_ms}ms {blend:?} {dispose:?}"
        );

        if x + width > canvas_width || y + height > canvas_height {
            return Err(DecodeError::InconsistentHeader(alloc::format!(
                "frame at ({x}, {y}) size {width}x{height} exceeds canvas {canvas_width}x{canvas_height}"
            )));
        }

        Ok(FrameHeader {
            x,
            y,
            width,
            height,
            duration_ms,
            blend,
            dispose,
            payload: &payload[16..],
        })
    }
}
