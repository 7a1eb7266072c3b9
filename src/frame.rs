use alloc::vec::Vec;

use imgref::{ImgRef, ImgVec};
use rgb::RGBA8;

use crate::bitmap::Bitmap;

/// One decoded frame, borrowed from the decoder.
///
/// For animations `bitmap` is the shared canvas: the next call to
/// [`crate::WebpDecoder::frame`] redraws it, so copy it out with
/// [`Frame::into_owned`] if it must outlive that call.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'d> {
    pub bitmap: &'d Bitmap,
    /// Display duration; 0 for still images.
    pub duration_ms: u32,
}

impl<'d> Frame<'d> {
    pub fn width(&self) -> u32 {
        self.bitmap.width()
    }

    pub fn height(&self) -> u32 {
        self.bitmap.height()
    }

    /// Raw RGBA bytes in scan order.
    pub fn pixels(&self) -> &'d [u8] {
        self.bitmap.as_bytes()
    }

    /// Zero-copy view as an [`imgref::ImgRef`] of RGBA pixels.
    pub fn as_imgref(&self) -> ImgRef<'d, RGBA8> {
        self.bitmap.as_imgref()
    }

    /// Copy the pixels into an [`imgref::ImgVec`].
    pub fn to_imgvec(&self) -> ImgVec<RGBA8> {
        let view = self.as_imgref();
        let pixels: Vec<RGBA8> = view.pixels().collect();
        ImgVec::new(pixels, view.width(), view.height())
    }

    /// Detach from the decoder.
    pub fn into_owned(self) -> DecodedFrame {
        DecodedFrame {
            bitmap: self.bitmap.clone(),
            duration_ms: self.duration_ms,
        }
    }
}

/// An owned frame, as collected by [`crate::decode_all`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedFrame {
    pub bitmap: Bitmap,
    pub duration_ms: u32,
}
