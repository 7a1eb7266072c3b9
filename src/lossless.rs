//! Seam for the lossless (`VP8L`) bitstream decoder.
//!
//! The entropy-coded lossless format is decoded elsewhere; this crate only
//! frames the input (dimensions, header vs. headerless alpha streams) and
//! consumes the resulting bitmap.

use crate::bitmap::Bitmap;
use crate::error::DecodeError;

/// One lossless image-stream handed to a [`LosslessDecode`] implementation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LosslessImage<'a> {
    pub width: u32,
    pub height: u32,
    /// `true` for a headerless stream inside an `ALPH` chunk, where only the
    /// green channel of the output is used. `false` for a `VP8L` chunk,
    /// whose 5-byte header has already been consumed.
    pub alpha_only: bool,
    /// For `VP8L` chunks, the header's alpha-is-used bit.
    pub alpha_is_used: bool,
    /// Entropy-coded data following any header.
    pub data: &'a [u8],
}

/// Decodes a lossless image-stream into a bitmap of the stated size.
pub trait LosslessDecode {
    fn decode(&self, image: &LosslessImage<'_>) -> Result<Bitmap, DecodeError>;
}

impl<F> LosslessDecode for F
where
    F: Fn(&LosslessImage<'_>) -> Result<Bitmap, DecodeError>,
{
    fn decode(&self, image: &LosslessImage<'_>) -> Result<Bitmap, DecodeError> {
        self(image)
    }
}

/// Default collaborator: rejects every lossless stream.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoLossless;

impl LosslessDecode for NoLossless {
    fn decode(&self, _image: &LosslessImage<'_>) -> Result<Bitmap, DecodeError> {
        Err(DecodeError::unsupported(
            "no lossless bitstream decoder configured",
        ))
    }
}
