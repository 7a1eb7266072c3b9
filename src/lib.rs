//! # zenriff
//!
//! Decoder for the RIFF-based WebP container.
//!
//! Validates the outer `RIFF`/`WEBP` envelope, walks its chunks, decodes
//! the `VP8 `, `VP8L`, `VP8X`, `ANIM` and `ANMF` headers, merges separate
//! `ALPH` planes and composites animation frames onto a persistent canvas.
//!
//! ## Zero-Copy Parsing
//!
//! Chunks, metadata payloads and frame headers are views into the caller's
//! buffer. Only bitmaps are allocated.
//!
//! ## Lazy Decoding
//!
//! [`WebpDecoder`] does no work when created. Each query advances the
//! decoder through exactly the [`Phase`]s it needs and caches the result.
//! The first failure is cached too: every later query returns it.
//!
//! ## Non-Goals
//!
//! - Lossy (`VP8 `) pixel reconstruction. Headers are decoded, pixels are
//!   refused with [`DecodeError::UnsupportedFeature`].
//! - The lossless (`VP8L`) entropy decoder. Plug one in through
//!   [`LosslessDecode`].
//! - Encoding and muxing.
//!
//! ## Usage
//!
//! ```no_run
//! use zenriff::{LosslessImage, WebpDecoder, Bitmap, DecodeError};
//!
//! let data: &[u8] = &[]; // your WebP bytes
//!
//! // Probe without decoding
//! if !zenriff::probe(data) {
//!     return Ok(());
//! }
//!
//! let my_vp8l = |image: &LosslessImage<'_>| -> Result<Bitmap, DecodeError> {
//!     Ok(Bitmap::new(image.width, image.height))
//! };
//! let mut decoder = WebpDecoder::new(data).with_lossless(my_vp8l);
//! let (width, height) = decoder.size()?;
//! let frame = decoder.frame(0)?;
//! assert_eq!((frame.width(), frame.height()), (width, height));
//! # Ok::<(), zenriff::DecodeError>(())
//! ```

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod alpha;
mod bitmap;
mod chunk;
mod classify;
mod compositor;
mod container;
mod decoder;
mod error;
mod frame;
mod headers;
mod limits;
mod lossless;
mod still;
mod tag;

// Re-exports
pub use bitmap::{Bitmap, argb_to_rgba, rgba_to_argb};
pub use chunk::{Chunk, ChunkReader};
pub use classify::ImageData;
pub use container::probe;
pub use decoder::{DecodedImage, Format, Phase, WebpDecoder, decode_all};
pub use error::DecodeError;
pub use frame::{DecodedFrame, Frame};
pub use headers::{
    AnimationHeader, BlendMethod, DisposeMethod, ExtendedHeader, FrameHeader, LosslessHeader,
    LossyHeader,
};
pub use limits::Limits;
pub use lossless::{LosslessDecode, LosslessImage, NoLossless};
pub use rgb::RGBA8;
pub use tag::{ChunkKind, Tag};
