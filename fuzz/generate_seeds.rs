#!/usr/bin/env -S cargo +nightly -Zscript
//! Generate seed corpus files for fuzzing.
//! Run: cargo +nightly -Zscript fuzz/generate_seeds.rs

fn chunk(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut v = tag.to_vec();
    v.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    v.extend_from_slice(payload);
    if payload.len() % 2 == 1 {
        v.push(0);
    }
    v
}

fn riff(chunks: &[Vec<u8>]) -> Vec<u8> {
    let body = chunks.concat();
    let mut v = b"RIFF".to_vec();
    v.extend_from_slice(&(body.len() as u32 + 4).to_le_bytes());
    v.extend_from_slice(b"WEBP");
    v.extend_from_slice(&body);
    v
}

fn u24(v: u32) -> [u8; 3] {
    [v as u8, (v >> 8) as u8, (v >> 16) as u8]
}

fn vp8l(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let bits = (w - 1) | ((h - 1) << 14) | (1 << 28);
    let mut p = vec![0x2f];
    p.extend_from_slice(&bits.to_le_bytes());
    p.extend_from_slice(&rgba);
    chunk(b"VP8L", &p)
}

fn vp8x(flags: u8, w: u32, h: u32) -> Vec<u8> {
    let mut p = vec![flags, 0, 0, 0];
    p.extend_from_slice(&u24(w - 1));
    p.extend_from_slice(&u24(h - 1));
    chunk(b"VP8X", &p)
}

fn anmf(x: u32, y: u32, w: u32, h: u32, flags: u8, image: Vec<u8>) -> Vec<u8> {
    let mut p = Vec::new();
    for v in [x / 2, y / 2, w - 1, h - 1, 50] {
        p.extend_from_slice(&u24(v));
    }
    p.push(flags);
    p.extend_from_slice(&image);
    chunk(b"ANMF", &p)
}

fn main() {
    use std::fs;
    let dir = "fuzz/corpus/fuzz_decode";
    fs::create_dir_all(dir).unwrap();

    // Simple lossless 2x2
    fs::write(
        format!("{dir}/lossless_2x2.webp"),
        riff(&[vp8l(2, 2, [255, 0, 0, 255])]),
    )
    .unwrap();

    // Simple lossy key frame header 16x16
    let vp8 = [0x10, 0, 0, 0x9d, 0x01, 0x2a, 16, 0, 16, 0];
    fs::write(format!("{dir}/lossy_16x16.webp"), riff(&[chunk(b"VP8 ", &vp8)])).unwrap();

    // Extended still with metadata
    let extended = riff(&[
        vp8x(0x20 | 0x08 | 0x04, 2, 2),
        chunk(b"ICCP", b"icc"),
        vp8l(2, 2, [0, 255, 0, 255]),
        chunk(b"EXIF", b"exif"),
        chunk(b"XMP ", b"xmp"),
    ]);
    fs::write(format!("{dir}/extended_meta.webp"), extended).unwrap();

    // Animation: dispose-to-background, then a blended frame with ALPH
    let mut anim = 0xff20_4060u32.to_le_bytes().to_vec();
    anim.extend_from_slice(&3u16.to_le_bytes());
    let animated = riff(&[
        vp8x(0x02 | 0x10, 4, 4),
        chunk(b"ANIM", &anim),
        anmf(0, 0, 4, 4, 0x01, vp8l(4, 4, [255, 0, 0, 255])),
        anmf(
            2,
            2,
            2,
            2,
            0x00,
            [chunk(b"ALPH", &[0, 1, 2, 3, 4]), vp8l(2, 2, [0, 0, 255, 128])].concat(),
        ),
    ]);
    fs::write(format!("{dir}/animated.webp"), animated).unwrap();

    // Truncated/malformed seeds for edge coverage
    fs::write(format!("{dir}/empty.bin"), b"").unwrap();
    fs::write(format!("{dir}/riff_only.bin"), b"RIFF\x04\0\0\0WEBP").unwrap();
    fs::write(format!("{dir}/bad_pad.bin"), b"RIFF\x10\0\0\0WEBPVP8L\x01\0\0\0\x2f\x07").unwrap();
    fs::write(format!("{dir}/huge_size.bin"), b"RIFF\xff\xff\xff\xffWEBP").unwrap();

    println!("Generated seed corpus in {dir}/");
}
