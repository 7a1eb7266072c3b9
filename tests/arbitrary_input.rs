//! No query may panic, whatever the input.

mod common;

use common::*;
use proptest::prelude::*;
use zenriff::*;

fn exercise(data: &[u8]) {
    let _ = probe(data);
    let limits = Limits {
        max_pixels: Some(1 << 16),
        ..Limits::default()
    };
    let mut decoder = WebpDecoder::new(data)
        .with_lossless(lossless)
        .with_limits(limits);
    let _ = decoder.size();
    let _ = decoder.format();
    let _ = decoder.has_alpha();
    let _ = decoder.icc_profile();
    let _ = decoder.exif();
    let _ = decoder.xmp();
    let _ = decoder.loop_count();
    let count = decoder.frame_count().unwrap_or(0).min(8);
    for i in (0..count).rev() {
        let _ = decoder.frame_header(i);
        let _ = decoder.frame(i);
    }
}

/// A small animated file to mutate.
fn seed() -> Vec<u8> {
    riff(&[
        vp8x(ANIMATION | ICC, 4, 4),
        chunk(b"ICCP", b"icc"),
        anim(0xff80_8080, 2),
        anmf(0, 0, 4, 4, 10, DISPOSE_TO_BACKGROUND, &[solid(4, 4, RED)]),
        anmf(2, 2, 2, 2, 10, 0, &[chunk(b"ALPH", &[0; 5]), solid(2, 2, BLUE)]),
    ])
}

proptest! {
    #[test]
    fn random_bytes_never_panic(data in proptest::collection::vec(any::<u8>(), 0..256)) {
        exercise(&data);
    }

    #[test]
    fn random_chunks_never_panic(data in proptest::collection::vec(any::<u8>(), 0..128)) {
        for chunk in ChunkReader::new(&data) {
            if chunk.is_err() {
                break;
            }
        }
        exercise(&riff(&[data]));
    }

    #[test]
    fn mutated_file_never_panics(
        edits in proptest::collection::vec((any::<prop::sample::Index>(), any::<u8>()), 1..8)
    ) {
        let mut data = seed();
        for (at, byte) in edits {
            let i = at.index(data.len());
            data[i] = byte;
        }
        exercise(&data);
    }
}
