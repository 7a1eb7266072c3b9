//! `ALPH` chunk: a separate alpha plane for a lossy image.

use crate::bitmap::Bitmap;
use crate::error::DecodeError;
use crate::lossless::{LosslessDecode, LosslessImage};

/// Decoded `ALPH` header byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct AlphaFlags {
    pub preprocessing: u8,
    pub filtering: u8,
    /// 0 = raw, anything else = lossless image-stream.
    pub compression: u8,
}

impl AlphaFlags {
    fn from_byte(b: u8) -> Self {
        Self {
            preprocessing: (b >> 4) & 3,
            filtering: (b >> 2) & 3,
            compression: b & 3,
        }
    }
}

/// Replace the alpha channel of `bitmap` with the plane stored in `payload`.
pub(crate) fn apply_alpha(
    payload: &[u8],
    bitmap: &mut Bitmap,
    lossless: &dyn LosslessDecode,
) -> Result<(), DecodeError> {
    let Some((&flags, data)) = payload.split_first() else {
        return Err(DecodeError::chunk("'ALPH' chunk too small"));
    };
    let flags = AlphaFlags::from_byte(flags);
    log::debug!(
        "preprocessing {} filtering {} compression {}",
        flags.preprocessing,
        flags.filtering,
        flags.compression
    );

    let pixel_count = bitmap.pixel_count();

    if flags.compression == 0 {
        if data.len() < pixel_count {
            return Err(DecodeError::MalformedChunk(alloc::format!(
                "uncompressed 'ALPH' has {} bytes for {pixel_count} pixels",
                data.len()
            )));
        }
        for (px, &a) in bitmap.pixels_mut().iter_mut().zip(data) {
            px.a = a;
        }
        return Ok(());
    }

    let plane = lossless.decode(&LosslessImage {
        width: bitmap.width(),
        height: bitmap.height(),
        alpha_only: true,
        alpha_is_used: false,
        data,
    })?;
    if plane.pixel_count() != pixel_count {
        return Err(DecodeError::InconsistentHeader(alloc::format!(
            "decompressed 'ALPH' has {} pixels, image has {pixel_count}",
            plane.pixel_count()
        )));
    }
    // alpha lives in the green channel of the decoded stream
    for (px, src) in bitmap.pixels_mut().iter_mut().zip(plane.pixels()) {
        px.a = src.g;
    }
    Ok(())
}
