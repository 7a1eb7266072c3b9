//! Byte builders for synthetic RIFF/WebP files and a stand-in lossless
//! decoder.
//!
//! The stand-in reads the bytes after the `VP8L` header as plain pixels:
//! 4 bytes fill the whole image with one RGBA color, `width * height * 4`
//! bytes give every pixel. Alpha-only streams carry one byte per pixel,
//! returned in the green channel.

#![allow(dead_code)]

use zenriff::{Bitmap, DecodeError, Limits, LosslessImage, RGBA8};

pub fn chunk(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut v = tag.to_vec();
    v.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    v.extend_from_slice(payload);
    if payload.len() % 2 == 1 {
        v.push(0);
    }
    v
}

/// Wrap concatenated chunks in a `RIFF`/`WEBP` envelope.
pub fn riff(chunks: &[Vec<u8>]) -> Vec<u8> {
    let body: Vec<u8> = chunks.concat();
    let mut v = b"RIFF".to_vec();
    v.extend_from_slice(&(body.len() as u32 + 4).to_le_bytes());
    v.extend_from_slice(b"WEBP");
    v.extend_from_slice(&body);
    v
}

pub fn u24(v: u32) -> [u8; 3] {
    [v as u8, (v >> 8) as u8, (v >> 16) as u8]
}

pub const ICC: u8 = 0x20;
pub const ALPHA: u8 = 0x10;
pub const EXIF: u8 = 0x08;
pub const XMP: u8 = 0x04;
pub const ANIMATION: u8 = 0x02;

pub fn vp8x(flags: u8, width: u32, height: u32) -> Vec<u8> {
    let mut p = vec![flags, 0, 0, 0];
    p.extend_from_slice(&u24(width - 1));
    p.extend_from_slice(&u24(height - 1));
    chunk(b"VP8X", &p)
}

/// `VP8L` chunk whose stream is understood by [`lossless`].
pub fn vp8l(width: u32, height: u32, alpha_is_used: bool, stream: &[u8]) -> Vec<u8> {
    let bits = (width - 1) | ((height - 1) << 14) | (u32::from(alpha_is_used) << 28);
    let mut p = vec![0x2f];
    p.extend_from_slice(&bits.to_le_bytes());
    p.extend_from_slice(stream);
    chunk(b"VP8L", &p)
}

/// `VP8L` chunk for a solid-colored image.
pub fn solid(width: u32, height: u32, color: RGBA8) -> Vec<u8> {
    vp8l(width, height, color.a != 255, &[color.r, color.g, color.b, color.a])
}

/// `VP8 ` key frame header only (no partitions).
pub fn vp8(width: u16, height: u16) -> Vec<u8> {
    // key frame, version 0, shown, partition size 0
    let mut p = vec![0x10, 0, 0, 0x9d, 0x01, 0x2a];
    p.extend_from_slice(&width.to_le_bytes());
    p.extend_from_slice(&height.to_le_bytes());
    chunk(b"VP8 ", &p)
}

pub fn anim(background_argb: u32, loop_count: u16) -> Vec<u8> {
    let mut p = background_argb.to_le_bytes().to_vec();
    p.extend_from_slice(&loop_count.to_le_bytes());
    chunk(b"ANIM", &p)
}

pub const DISPOSE_TO_BACKGROUND: u8 = 0x01;
pub const NO_BLEND: u8 = 0x02;

/// `ANMF` chunk; `x` and `y` must be even.
#[allow(clippy::too_many_arguments)]
pub fn anmf(
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    duration_ms: u32,
    flags: u8,
    image: &[Vec<u8>],
) -> Vec<u8> {
    let mut p = Vec::new();
    p.extend_from_slice(&u24(x / 2));
    p.extend_from_slice(&u24(y / 2));
    p.extend_from_slice(&u24(width - 1));
    p.extend_from_slice(&u24(height - 1));
    p.extend_from_slice(&u24(duration_ms));
    p.push(flags);
    p.extend_from_slice(&image.concat());
    chunk(b"ANMF", &p)
}

pub fn lossless(image: &LosslessImage<'_>) -> Result<Bitmap, DecodeError> {
    let (w, h) = (image.width, image.height);
    let count = (w * h) as usize;
    if image.alpha_only {
        if image.data.len() != count {
            return Err(DecodeError::Lossless("bad alpha stream".into()));
        }
        let pixels = image.data.iter().map(|&a| RGBA8::new(0, a, 0, 255)).collect();
        return Bitmap::from_pixels(w, h, pixels);
    }
    match image.data {
        [r, g, b, a] => Bitmap::try_filled(w, h, RGBA8::new(*r, *g, *b, *a), &Limits::default()),
        data if data.len() == count * 4 => {
            let pixels = data
                .chunks_exact(4)
                .map(|p| RGBA8::new(p[0], p[1], p[2], p[3]))
                .collect();
            Bitmap::from_pixels(w, h, pixels)
        }
        _ => Err(DecodeError::Lossless("bad pixel stream".into())),
    }
}

pub const RED: RGBA8 = RGBA8 { r: 255, g: 0, b: 0, a: 255 };
pub const GREEN: RGBA8 = RGBA8 { r: 0, g: 255, b: 0, a: 255 };
pub const BLUE: RGBA8 = RGBA8 { r: 0, g: 0, b: 255, a: 255 };
