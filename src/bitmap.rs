//! RGBA8 pixel buffer used for decoded frames and the animation canvas.

use alloc::vec;
use alloc::vec::Vec;

use imgref::{ImgRef, ImgVec};
use rgb::{ComponentBytes as _, RGBA8};

use crate::error::DecodeError;
use crate::limits::Limits;

/// Pixel count of a `w`x`h` RGBA8 buffer, if its byte size fits in `usize`.
fn buffer_len(w: usize, h: usize) -> Option<usize> {
    w.checked_mul(h).filter(|px| px.checked_mul(4).is_some())
}

/// Split an ARGB `u32` (alpha in the top byte) into an RGBA pixel.
#[inline]
pub fn argb_to_rgba(argb: u32) -> RGBA8 {
    RGBA8::new((argb >> 16) as u8, (argb >> 8) as u8, argb as u8, (argb >> 24) as u8)
}

#[inline]
pub fn rgba_to_argb(px: RGBA8) -> u32 {
    (u32::from(px.a) << 24) | (u32::from(px.r) << 16) | (u32::from(px.g) << 8) | u32::from(px.b)
}

/// An owned, non-premultiplied RGBA8 image.
#[derive(Clone)]
pub struct Bitmap {
    img: ImgVec<RGBA8>,
}

impl PartialEq for Bitmap {
    fn eq(&self, other: &Self) -> bool {
        self.img.width() == other.img.width()
            && self.img.height() == other.img.height()
            && self.img.buf() == other.img.buf()
    }
}

impl Eq for Bitmap {}

impl core::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.img.width())
            .field("height", &self.img.height())
            .finish_non_exhaustive()
    }
}

impl Bitmap {
    /// Allocate a bitmap filled with transparent black.
    ///
    /// # Panics
    ///
    /// Panics if `width * height` pixels do not fit in memory. Use
    /// [`Bitmap::try_new`] for sizes taken from untrusted input.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, RGBA8::new(0, 0, 0, 0))
    }

    /// Allocate a transparent bitmap after checking its size against
    /// `limits`. Allocation failure is reported instead of aborting.
    pub fn try_new(width: u32, height: u32, limits: &Limits) -> Result<Self, DecodeError> {
        Self::try_filled(width, height, RGBA8::new(0, 0, 0, 0), limits)
    }

    /// Allocate a bitmap filled with `color`.
    ///
    /// # Panics
    ///
    /// Panics if `width * height` pixels do not fit in memory. Use
    /// [`Bitmap::try_filled`] for sizes taken from untrusted input.
    pub fn filled(width: u32, height: u32, color: RGBA8) -> Self {
        let (w, h) = (width as usize, height as usize);
        let count = buffer_len(w, h)
            .unwrap_or_else(|| panic!("{width}x{height} bitmap does not fit in memory"));
        Self {
            img: ImgVec::new(vec![color; count], w, h),
        }
    }

    /// Fallible [`Bitmap::filled`]: checks `limits`, overflow and allocation.
    pub fn try_filled(
        width: u32,
        height: u32,
        color: RGBA8,
        limits: &Limits,
    ) -> Result<Self, DecodeError> {
        limits.check(width, height)?;
        let too_big =
            || DecodeError::LimitExceeded(alloc::format!("{width}x{height} does not fit in memory"));
        let (w, h) = (width as usize, height as usize);
        let count = buffer_len(w, h).ok_or_else(too_big)?;
        let mut pixels = Vec::new();
        pixels.try_reserve_exact(count).map_err(|_| too_big())?;
        pixels.resize(count, color);
        Ok(Self {
            img: ImgVec::new(pixels, w, h),
        })
    }

    /// Wrap existing pixels. Fails if `pixels.len() != width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<RGBA8>) -> Result<Self, DecodeError> {
        let (w, h) = (width as usize, height as usize);
        if w.checked_mul(h) != Some(pixels.len()) {
            return Err(DecodeError::InconsistentHeader(alloc::format!(
                "{} pixels for a {width}x{height} bitmap",
                pixels.len()
            )));
        }
        Ok(Self {
            img: ImgVec::new(pixels, w, h),
        })
    }

    pub fn width(&self) -> u32 {
        self.img.width() as u32
    }

    pub fn height(&self) -> u32 {
        self.img.height() as u32
    }

    pub fn pixel_count(&self) -> usize {
        self.img.width() * self.img.height()
    }

    /// Pixels in scan order.
    pub fn pixels(&self) -> &[RGBA8] {
        self.img.buf()
    }

    pub fn pixels_mut(&mut self) -> &mut [RGBA8] {
        self.img.buf_mut()
    }

    /// Raw RGBA bytes in scan order.
    pub fn as_bytes(&self) -> &[u8] {
        self.img.buf().as_bytes()
    }

    pub fn as_imgref(&self) -> ImgRef<'_, RGBA8> {
        self.img.as_ref()
    }

    pub fn into_imgvec(self) -> ImgVec<RGBA8> {
        self.img
    }

    /// ARGB value at `(x, y)`, or `None` outside the bitmap.
    pub fn argb(&self, x: u32, y: u32) -> Option<u32> {
        self.index(x, y).map(|i| rgba_to_argb(self.img.buf()[i]))
    }

    /// Set the pixel at `(x, y)`; out-of-bounds writes are ignored.
    pub fn set_argb(&mut self, x: u32, y: u32, argb: u32) {
        if let Some(i) = self.index(x, y) {
            self.img.buf_mut()[i] = argb_to_rgba(argb);
        }
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        let (x, y) = (x as usize, y as usize);
        (x < self.img.width() && y < self.img.height()).then(|| y * self.img.width() + x)
    }

    pub fn fill(&mut self, color: RGBA8) {
        self.img.buf_mut().fill(color);
    }

    /// Fill a rectangle, clipped to the bitmap.
    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: RGBA8) {
        let Some((x, y, w, h)) = self.clip(x, y, width, height) else {
            return;
        };
        let mut region = self.img.sub_image_mut(x, y, w, h);
        for row in region.rows_mut() {
            row.fill(color);
        }
    }

    /// Draw `src` with its top-left corner at `(x, y)`, clipped to this
    /// bitmap. With `blend` the source is composited over the destination;
    /// without it source pixels replace destination pixels as-is.
    pub fn blit(&mut self, src: &Bitmap, x: u32, y: u32, blend: bool) {
        let Some((x, y, w, h)) = self.clip(x, y, src.width(), src.height()) else {
            return;
        };
        let src_view = src.img.sub_image(0, 0, w, h);
        let mut dst_view = self.img.sub_image_mut(x, y, w, h);
        for (dst_row, src_row) in dst_view.rows_mut().zip(src_view.rows()) {
            if blend {
                for (d, s) in dst_row.iter_mut().zip(src_row) {
                    *d = blend_over(*d, *s);
                }
            } else {
                dst_row.copy_from_slice(src_row);
            }
        }
    }

    fn clip(&self, x: u32, y: u32, width: u32, height: u32) -> Option<(usize, usize, usize, usize)> {
        let (bw, bh) = (self.img.width(), self.img.height());
        let (x, y) = (x as usize, y as usize);
        if x >= bw || y >= bh || width == 0 || height == 0 {
            return None;
        }
        let w = (width as usize).min(bw - x);
        let h = (height as usize).min(bh - y);
        Some((x, y, w, h))
    }
}

/// Source-over compositing of non-premultiplied RGBA8.
pub(crate) fn blend_over(dst: RGBA8, src: RGBA8) -> RGBA8 {
    match src.a {
        255 => return src,
        0 => return dst,
        _ => {}
    }
    let sa = u32::from(src.a);
    // destination weight scaled to 0..=255*255
    let dw = u32::from(dst.a) * (255 - sa);
    let out_a = sa * 255 + dw;
    if out_a == 0 {
        return RGBA8::new(0, 0, 0, 0);
    }
    let mix = |s: u8, d: u8| -> u8 {
        let num = u32::from(s) * sa * 255 + u32::from(d) * dw;
        ((num + out_a / 2) / out_a) as u8
    };
    RGBA8::new(
        mix(src.r, dst.r),
        mix(src.g, dst.g),
        mix(src.b, dst.b),
        ((out_a + 127) / 255) as u8,
    )
}
