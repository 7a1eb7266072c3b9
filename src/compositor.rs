//! Animation canvas: replays frames in order with disposal and blending.

use crate::bitmap::{Bitmap, argb_to_rgba};
use crate::classify::ImageData;
use crate::error::DecodeError;
use crate::headers::{AnimationHeader, BlendMethod, DisposeMethod, FrameHeader};
use crate::limits::Limits;
use crate::lossless::LosslessDecode;
use crate::still::decode_image_data;

/// Persistent canvas plus the index of the last frame drawn onto it.
#[derive(Debug, Default)]
pub(crate) struct Compositor {
    canvas: Option<Bitmap>,
    last_rendered: Option<usize>,
}

/// Inputs shared by every replay step.
pub(crate) struct Animation<'s, 'a> {
    pub header: &'s AnimationHeader,
    pub frames: &'s [FrameHeader<'a>],
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub lossless: &'s dyn LosslessDecode,
    pub limits: &'s Limits,
}

impl Compositor {
    /// Render frame `index` onto the canvas and return that frame's duration.
    ///
    /// Requests at or after the last rendered frame continue from it; earlier
    /// requests (and the first one) start over from a background-filled canvas.
    pub(crate) fn render(
        &mut self,
        index: usize,
        anim: &Animation<'_, '_>,
    ) -> Result<u32, DecodeError> {
        let Some(target) = anim.frames.get(index) else {
            return Err(DecodeError::FrameIndexOutOfRange {
                index,
                count: anim.frames.len(),
            });
        };
        let background = argb_to_rgba(anim.header.background_color);

        let canvas = match self.canvas {
            Some(ref mut canvas) => canvas,
            None => {
                self.last_rendered = None;
                self.canvas.insert(Bitmap::try_new(
                    anim.canvas_width,
                    anim.canvas_height,
                    anim.limits,
                )?)
            }
        };
        let start = match self.last_rendered {
            Some(last) if index >= last => last + 1,
            _ => {
                canvas.fill(background);
                self.last_rendered = None;
                0
            }
        };
        log::trace!("frame {index}: replaying from {start}");

        for i in start..=index {
            let frame = &anim.frames[i];
            let image = ImageData::from_frame_payload(frame.payload, 0)?;
            let bitmap = decode_image_data(&image, anim.lossless, anim.limits)?;
            if bitmap.width() != frame.width || bitmap.height() != frame.height {
                return Err(DecodeError::InconsistentHeader(alloc::format!(
                    "frame {i} decoded to {}x{}, header says {}x{}",
                    bitmap.width(),
                    bitmap.height(),
                    frame.width,
                    frame.height
                )));
            }

            if i > 0 {
                let prev = &anim.frames[i - 1];
                if prev.dispose == DisposeMethod::ToBackground {
                    canvas.fill_rect(prev.x, prev.y, prev.width, prev.height, background);
                }
            }
            let blend = frame.blend == BlendMethod::AlphaBlend;
            canvas.blit(&bitmap, frame.x, frame.y, blend);

            self.last_rendered = Some(i);
            log::trace!("drew frame {i} at ({}, {})", frame.x, frame.y);
        }

        Ok(target.duration_ms)
    }

    /// The canvas as of the last rendered frame.
    pub(crate) fn canvas(&self) -> Option<&Bitmap> {
        self.last_rendered.and(self.canvas.as_ref())
    }
}
