mod common;

use common::*;
use zenriff::*;

#[test]
fn one_by_one_lossless() {
    let data = riff(&[vp8l(1, 1, false, &[10, 20, 30, 255])]);
    let mut decoder = WebpDecoder::new(&data).with_lossless(lossless);
    assert_eq!(decoder.size(), Ok((1, 1)));
    assert_eq!(decoder.is_animated(), Ok(false));
    assert_eq!(decoder.frame_count(), Ok(1));

    let first = decoder.frame(0).unwrap().into_owned();
    let second = decoder.frame(0).unwrap().into_owned();
    assert_eq!(first, second);
    assert_eq!(first.duration_ms, 0);
    assert_eq!(first.bitmap.pixels(), &[RGBA8::new(10, 20, 30, 255)]);
    assert_eq!(first.bitmap.argb(0, 0), Some(0xff0a_141e));
}

#[test]
fn still_is_decoded_once() {
    use std::cell::Cell;

    let calls = Cell::new(0);
    let counting = |image: &LosslessImage<'_>| {
        calls.set(calls.get() + 1);
        lossless(image)
    };
    let data = riff(&[solid(3, 3, BLUE)]);
    let mut decoder = WebpDecoder::new(&data).with_lossless(counting);
    decoder.frame(0).unwrap();
    decoder.frame(0).unwrap();
    decoder.size().unwrap();
    assert_eq!(calls.get(), 1);
}

#[test]
fn full_pixel_stream() {
    let stream: Vec<u8> = (0..6u8).flat_map(|i| [i, i * 2, i * 3, 255]).collect();
    let data = riff(&[vp8l(3, 2, false, &stream)]);
    let mut decoder = WebpDecoder::new(&data).with_lossless(lossless);
    let frame = decoder.frame(0).unwrap();
    assert_eq!((frame.width(), frame.height()), (3, 2));
    assert_eq!(frame.pixels(), &stream[..]);

    let img = frame.to_imgvec();
    assert_eq!(img.width(), 3);
    assert_eq!(img.buf()[4], RGBA8::new(4, 8, 12, 255));
}

#[test]
fn lossless_alpha_bit() {
    let clear = RGBA8::new(1, 2, 3, 0);
    let data = riff(&[solid(2, 2, clear)]);
    let mut decoder = WebpDecoder::new(&data).with_lossless(lossless);
    assert_eq!(decoder.has_alpha(), Ok(true));
    assert_eq!(decoder.frame(0).unwrap().bitmap.pixels()[3], clear);
}

#[test]
fn lossless_header_errors() {
    let mut bad_signature = solid(1, 1, RED);
    bad_signature[8] = 0x2e;
    assert!(matches!(
        WebpDecoder::new(&riff(&[bad_signature])).size(),
        Err(DecodeError::MalformedChunk(_))
    ));

    let mut version = solid(1, 1, RED);
    version[12] |= 0x20;
    assert!(matches!(
        WebpDecoder::new(&riff(&[version])).size(),
        Err(DecodeError::UnsupportedFeature(_))
    ));

    let short = chunk(b"VP8L", &[0x2f, 0, 0]);
    assert!(matches!(
        WebpDecoder::new(&riff(&[short])).size(),
        Err(DecodeError::MalformedChunk(_))
    ));
}

#[test]
fn collaborator_errors_are_cached() {
    let data = riff(&[vp8l(2, 2, false, &[1, 2, 3])]);
    let mut decoder = WebpDecoder::new(&data).with_lossless(lossless);
    let err = decoder.frame(0).unwrap_err();
    assert!(matches!(err, DecodeError::Lossless(_)));
    assert_eq!(decoder.frame(0).unwrap_err(), err);
    assert_eq!(decoder.phase(), Phase::Error);
}

#[test]
fn collaborator_size_is_checked() {
    let wrong_size = |image: &LosslessImage<'_>| -> Result<Bitmap, DecodeError> {
        Ok(Bitmap::new(image.width + 1, image.height))
    };
    let data = riff(&[solid(2, 2, RED)]);
    let mut decoder = WebpDecoder::new(&data).with_lossless(wrong_size);
    assert!(matches!(
        decoder.frame(0),
        Err(DecodeError::InconsistentHeader(_))
    ));
}

#[test]
fn simple_lossy_size_and_scale() {
    // width 300 with scale bits set: only the low 14 bits are the size
    let data = riff(&[vp8(300 | (1 << 14), 200)]);
    let mut decoder = WebpDecoder::new(&data);
    assert_eq!(decoder.size(), Ok((300, 200)));
    assert_eq!(decoder.has_alpha(), Ok(false));
    assert_eq!(decoder.frame_count(), Ok(1));
    assert!(matches!(
        decoder.frame(0),
        Err(DecodeError::UnsupportedFeature(_))
    ));
}

#[test]
fn lossy_inter_frame_is_unsupported() {
    let mut inter = vp8(16, 16);
    inter[8] |= 0x01;
    assert!(matches!(
        WebpDecoder::new(&riff(&[inter])).size(),
        Err(DecodeError::UnsupportedFeature(_))
    ));

    let mut bad_start = vp8(16, 16);
    bad_start[11] = 0;
    assert!(matches!(
        WebpDecoder::new(&riff(&[bad_start])).size(),
        Err(DecodeError::MalformedChunk(_))
    ));
}

#[test]
fn still_respects_limits() {
    let data = riff(&[solid(64, 64, RED)]);
    let limits = Limits {
        max_width: Some(32),
        ..Limits::default()
    };
    let mut decoder = WebpDecoder::new(&data)
        .with_lossless(lossless)
        .with_limits(limits);
    assert_eq!(decoder.size(), Ok((64, 64)));
    assert!(matches!(
        decoder.frame(0),
        Err(DecodeError::LimitExceeded(_))
    ));
}

#[test]
fn decode_all_still() {
    let data = riff(&[solid(2, 2, GREEN)]);
    let image = decode_all(&data, lossless).unwrap();
    assert!(!image.is_animated);
    assert_eq!(image.loop_count, 0);
    assert_eq!(image.frames.len(), 1);
    let frame = image.frames[0].as_ref().unwrap();
    assert!(frame.bitmap.pixels().iter().all(|&p| p == GREEN));

    // a still that cannot be decoded is one failed frame
    let lossy = riff(&[vp8(8, 8)]);
    let image = decode_all(&lossy, NoLossless).unwrap();
    assert_eq!(image.frames, vec![None]);

    let truncated = &data[..data.len() - 2];
    assert!(decode_all(truncated, lossless).is_none());
}
