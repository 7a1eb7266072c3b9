//! Turning one [`ImageData`] into pixels.

use crate::alpha::apply_alpha;
use crate::bitmap::Bitmap;
use crate::classify::ImageData;
use crate::error::DecodeError;
use crate::headers::{LossyHeader, LosslessHeader};
use crate::limits::Limits;
use crate::lossless::{LosslessDecode, LosslessImage};
use crate::tag::ChunkKind;

/// Decode a still image (or one animation frame's image data).
pub(crate) fn decode_image_data(
    data: &ImageData<'_>,
    lossless: &dyn LosslessDecode,
    limits: &Limits,
) -> Result<Bitmap, DecodeError> {
    match data.image.tag.kind() {
        ChunkKind::Lossless => {
            let (header, stream) = LosslessHeader::parse(data.image.payload)?;
            limits.check(header.width, header.height)?;
            let bitmap = lossless.decode(&LosslessImage {
                width: header.width,
                height: header.height,
                alpha_only: false,
                alpha_is_used: header.alpha_is_used,
                data: stream,
            })?;
            if bitmap.width() != header.width || bitmap.height() != header.height {
                return Err(DecodeError::InconsistentHeader(alloc::format!(
                    "lossless decoder returned {}x{}, header says {}x{}",
                    bitmap.width(),
                    bitmap.height(),
                    header.width,
                    header.height
                )));
            }
            Ok(bitmap)
        }
        ChunkKind::Lossy => {
            let mut bitmap = decode_lossy(data.image.payload, limits)?;
            if let Some(alpha) = data.alpha {
                apply_alpha(alpha.payload, &mut bitmap, lossless)?;
            }
            Ok(bitmap)
        }
        _ => Err(DecodeError::inconsistent("missing image data")),
    }
}

/// Lossy pixel reconstruction is not implemented: the header is validated
/// and then the request is refused.
fn decode_lossy(payload: &[u8], limits: &Limits) -> Result<Bitmap, DecodeError> {
    let header = LossyHeader::parse(payload)?;
    limits.check(u32::from(header.width), u32::from(header.height))?;
    Err(DecodeError::unsupported("decoding lossy 'VP8 ' bitstreams"))
}
