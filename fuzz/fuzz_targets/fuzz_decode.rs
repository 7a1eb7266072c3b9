#![no_main]
use libfuzzer_sys::fuzz_target;
use zenriff::{Bitmap, DecodeError, LosslessImage, Limits, WebpDecoder};

// Treats the stream as one RGBA color so frames take the full compositing path.
fn solid(image: &LosslessImage<'_>) -> Result<Bitmap, DecodeError> {
    match image.data {
        [r, g, b, a, ..] => Bitmap::try_filled(
            image.width,
            image.height,
            zenriff::RGBA8::new(*r, *g, *b, *a),
            &Limits::default(),
        ),
        _ => Err(DecodeError::Lossless("stream too short".into())),
    }
}

fuzz_target!(|data: &[u8]| {
    let _ = zenriff::probe(data);

    // Every query must return, never panic
    let limits = Limits {
        max_pixels: Some(1 << 20),
        ..Limits::default()
    };
    let mut decoder = WebpDecoder::new(data).with_lossless(solid).with_limits(limits);
    let _ = decoder.size();
    let _ = decoder.format();
    let _ = decoder.is_animated();
    let _ = decoder.has_alpha();
    let _ = decoder.extended_header();
    let _ = decoder.icc_profile();
    let _ = decoder.exif();
    let _ = decoder.xmp();
    let _ = decoder.loop_count();
    let _ = decoder.animation_header();
    let count = decoder.frame_count().unwrap_or(0).min(16);
    for i in 0..count {
        let _ = decoder.frame_header(i);
        let _ = decoder.frame(i);
    }
    // backward seek replays from the first frame
    if count > 1 {
        let _ = decoder.frame(0);
    }
});
