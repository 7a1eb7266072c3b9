//! Lazy, memoizing decode state machine.
//!
//! Every query advances the decoder through exactly the phases it needs.
//! Results are cached, so repeated queries are cheap. The first failure is
//! cached as well: the decoder enters [`Phase::Error`] and every later
//! query returns that same error without redoing any work.

use alloc::vec::Vec;

use crate::bitmap::Bitmap;
use crate::chunk::{Chunk, ChunkReader};
use crate::classify::{ExtendedChunks, ImageData, classify};
use crate::compositor::{Animation, Compositor};
use crate::container::{self, HEADER_LEN};
use crate::error::DecodeError;
use crate::frame::{DecodedFrame, Frame};
use crate::headers::{AnimationHeader, ExtendedHeader, FrameHeader, LosslessHeader, LossyHeader};
use crate::limits::Limits;
use crate::lossless::{LosslessDecode, NoLossless};
use crate::still::decode_image_data;
use crate::tag::ChunkKind;

/// Decoder progress. Advances strictly forward; [`Phase::Error`] is terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    #[default]
    Start,
    HeaderValidated,
    FirstChunkRead,
    FirstChunkHeaderDecoded,
    ChunksClassified,
    AnimationHeadersDecoded,
    /// At least one frame has been produced.
    FrameRendered,
    Error,
}

impl Phase {
    /// The phase a decode step moves to from `self`, if any.
    fn next(self) -> Option<Phase> {
        match self {
            Phase::Start => Some(Phase::HeaderValidated),
            Phase::HeaderValidated => Some(Phase::FirstChunkRead),
            Phase::FirstChunkRead => Some(Phase::FirstChunkHeaderDecoded),
            Phase::FirstChunkHeaderDecoded => Some(Phase::ChunksClassified),
            Phase::ChunksClassified => Some(Phase::AnimationHeadersDecoded),
            Phase::AnimationHeadersDecoded => Some(Phase::FrameRendered),
            Phase::FrameRendered | Phase::Error => None,
        }
    }
}

/// Which of the three file layouts the first chunk selects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    /// `VP8 ` only.
    SimpleLossy,
    /// `VP8L` only.
    SimpleLossless,
    /// `VP8X` followed by any number of chunks.
    Extended,
}

/// Values derived so far. Each field is valid once `phase` has reached the
/// phase that computes it.
#[derive(Debug, Default)]
struct State<'a> {
    phase: Phase,
    failure: Option<DecodeError>,
    /// Input trimmed to the declared container size. `HeaderValidated`.
    body: &'a [u8],
    /// `FirstChunkRead`.
    first: Chunk<'a>,
    /// Offset into `body` just past the first chunk. `FirstChunkRead`.
    cursor: usize,
    /// `FirstChunkHeaderDecoded`.
    width: u32,
    height: u32,
    has_alpha: bool,
    /// Meaningful for extended files only. `FirstChunkHeaderDecoded`.
    extended: ExtendedHeader,
    /// `ChunksClassified`.
    chunks: ExtendedChunks<'a>,
    /// Animated files only. `AnimationHeadersDecoded`.
    animation: AnimationHeader,
    frames: Vec<FrameHeader<'a>>,
    /// Still images only. `FrameRendered`.
    still: Option<Bitmap>,
    compositor: Compositor,
}

/// Decoder for one RIFF/WebP buffer.
///
/// Creating a decoder does no work; queries decode on demand.
///
/// ```no_run
/// use zenriff::WebpDecoder;
///
/// let data: &[u8] = &[]; // your WebP bytes
/// let mut decoder = WebpDecoder::new(data);
/// let (w, h) = decoder.size()?;
/// for i in 0..decoder.frame_count()? {
///     let frame = decoder.frame(i)?;
///     println!("{w}x{h} frame {i}: {}ms", frame.duration_ms);
/// }
/// # Ok::<(), zenriff::DecodeError>(())
/// ```
pub struct WebpDecoder<'a, L = NoLossless> {
    data: &'a [u8],
    limits: Limits,
    lossless: L,
    state: State<'a>,
}

impl<'a> WebpDecoder<'a, NoLossless> {
    /// Wrap `data`. Lossless bitstreams are rejected until a decoder is
    /// supplied with [`WebpDecoder::with_lossless`].
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            limits: Limits::default(),
            lossless: NoLossless,
            state: State::default(),
        }
    }
}

impl<'a, L: LosslessDecode> WebpDecoder<'a, L> {
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Use `lossless` to decode `VP8L` bitstreams and compressed alpha.
    pub fn with_lossless<M: LosslessDecode>(self, lossless: M) -> WebpDecoder<'a, M> {
        WebpDecoder {
            data: self.data,
            limits: self.limits,
            lossless,
            state: self.state,
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// The error that stopped this decoder, if any.
    pub fn error(&self) -> Option<&DecodeError> {
        self.state.failure.as_ref()
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Image size: the canvas size for extended files.
    pub fn size(&mut self) -> Result<(u32, u32), DecodeError> {
        self.run(|this| {
            this.ensure(Phase::FirstChunkHeaderDecoded)?;
            Ok((this.state.width, this.state.height))
        })
    }

    pub fn format(&mut self) -> Result<Format, DecodeError> {
        self.run(|this| {
            this.ensure(Phase::FirstChunkRead)?;
            Ok(match this.state.first.tag.kind() {
                ChunkKind::Lossy => Format::SimpleLossy,
                ChunkKind::Lossless => Format::SimpleLossless,
                _ => Format::Extended,
            })
        })
    }

    /// `true` only for extended files with the animation flag set.
    pub fn is_animated(&mut self) -> Result<bool, DecodeError> {
        self.run(|this| {
            this.ensure(Phase::FirstChunkHeaderDecoded)?;
            Ok(this.animated())
        })
    }

    pub fn has_alpha(&mut self) -> Result<bool, DecodeError> {
        self.run(|this| {
            this.ensure(Phase::FirstChunkHeaderDecoded)?;
            Ok(this.state.has_alpha)
        })
    }

    /// The `VP8X` header, for extended files.
    pub fn extended_header(&mut self) -> Result<Option<ExtendedHeader>, DecodeError> {
        self.run(|this| {
            this.ensure(Phase::FirstChunkHeaderDecoded)?;
            Ok(this.extended().then_some(this.state.extended))
        })
    }

    /// Number of times to play the animation; 0 means forever, and is also
    /// returned for still images.
    pub fn loop_count(&mut self) -> Result<u32, DecodeError> {
        self.run(|this| {
            this.ensure(Phase::FirstChunkHeaderDecoded)?;
            if !this.animated() {
                return Ok(0);
            }
            this.ensure(Phase::AnimationHeadersDecoded)?;
            Ok(u32::from(this.state.animation.loop_count))
        })
    }

    /// 1 for still images; the number of `ANMF` chunks for animations.
    pub fn frame_count(&mut self) -> Result<usize, DecodeError> {
        self.run(|this| {
            this.ensure(Phase::FirstChunkHeaderDecoded)?;
            if !this.animated() {
                return Ok(1);
            }
            this.ensure(Phase::ChunksClassified)?;
            Ok(this.state.chunks.frames.len())
        })
    }

    pub fn first_animated_frame_index(&self) -> usize {
        0
    }

    /// The `ANIM` header, for animations.
    pub fn animation_header(&mut self) -> Result<Option<AnimationHeader>, DecodeError> {
        self.run(|this| {
            this.ensure(Phase::AnimationHeadersDecoded)?;
            Ok(this.animated().then_some(this.state.animation))
        })
    }

    /// Header of animation frame `index`, or `None` past the last frame and
    /// for still images.
    pub fn frame_header(&mut self, index: usize) -> Result<Option<FrameHeader<'a>>, DecodeError> {
        self.run(|this| {
            this.ensure(Phase::AnimationHeadersDecoded)?;
            Ok(this.state.frames.get(index).copied())
        })
    }

    /// Decode frame `index`.
    ///
    /// Animations are composited onto one canvas that is reused between
    /// calls: moving forward continues from the last rendered frame, moving
    /// backward replays from frame 0.
    pub fn frame(&mut self, index: usize) -> Result<Frame<'_>, DecodeError> {
        let count = self.frame_count()?;
        if index >= count {
            return Err(DecodeError::FrameIndexOutOfRange { index, count });
        }
        let duration_ms = self.run(|this| this.render(index))?;

        let bitmap = if self.animated() {
            self.state.compositor.canvas()
        } else {
            self.state.still.as_ref()
        };
        bitmap
            .map(|bitmap| Frame {
                bitmap,
                duration_ms,
            })
            .ok_or_else(|| DecodeError::inconsistent("no frame was rendered"))
    }

    /// Raw ICC profile bytes, if the file carries an `ICCP` chunk.
    pub fn icc_profile(&mut self) -> Result<Option<&'a [u8]>, DecodeError> {
        self.run(|this| {
            this.ensure(Phase::ChunksClassified)?;
            Ok(this.state.chunks.icc.map(|c| c.payload))
        })
    }

    /// Raw `EXIF` chunk payload.
    pub fn exif(&mut self) -> Result<Option<&'a [u8]>, DecodeError> {
        self.run(|this| {
            this.ensure(Phase::ChunksClassified)?;
            Ok(this.state.chunks.exif.map(|c| c.payload))
        })
    }

    /// Raw `XMP ` chunk payload.
    pub fn xmp(&mut self) -> Result<Option<&'a [u8]>, DecodeError> {
        self.run(|this| {
            this.ensure(Phase::ChunksClassified)?;
            Ok(this.state.chunks.xmp.map(|c| c.payload))
        })
    }

    // ── State machine ───────────────────────────────────────────────

    /// Run a query, recording its failure as terminal.
    fn run<T>(
        &mut self,
        query: impl FnOnce(&mut Self) -> Result<T, DecodeError>,
    ) -> Result<T, DecodeError> {
        if let Some(err) = &self.state.failure {
            return Err(err.clone());
        }
        query(self).inspect_err(|err| {
            if !matches!(err, DecodeError::FrameIndexOutOfRange { .. }) {
                log::debug!("decoder failed in {:?}: {err}", self.state.phase);
                self.state.failure = Some(err.clone());
                self.state.phase = Phase::Error;
            }
        })
    }

    /// Perform the missing steps up to and including `target`.
    fn ensure(&mut self, target: Phase) -> Result<(), DecodeError> {
        debug_assert!(target <= Phase::AnimationHeadersDecoded);
        while self.state.phase < target {
            let Some(next) = self.state.phase.next() else {
                break;
            };
            match next {
                Phase::HeaderValidated => self.validate_header()?,
                Phase::FirstChunkRead => self.read_first_chunk()?,
                Phase::FirstChunkHeaderDecoded => self.decode_first_chunk_header()?,
                Phase::ChunksClassified => self.classify_chunks()?,
                Phase::AnimationHeadersDecoded => self.decode_animation_headers()?,
                Phase::Start | Phase::FrameRendered | Phase::Error => break,
            }
            self.advance(next);
        }
        Ok(())
    }

    /// The only place `phase` moves forward.
    fn advance(&mut self, to: Phase) {
        debug_assert!(self.state.phase != Phase::Error);
        if to > self.state.phase {
            log::trace!("{:?} -> {to:?}", self.state.phase);
            self.state.phase = to;
        }
    }

    fn extended(&self) -> bool {
        self.state.first.tag.kind() == ChunkKind::Extended
    }

    fn animated(&self) -> bool {
        self.extended() && self.state.extended.has_animation
    }

    // ── Steps ───────────────────────────────────────────────────────

    fn validate_header(&mut self) -> Result<(), DecodeError> {
        self.state.body = container::validate(self.data)?;
        Ok(())
    }

    fn read_first_chunk(&mut self) -> Result<(), DecodeError> {
        let body = self.state.body;
        let mut chunks = ChunkReader::with_base(&body[HEADER_LEN..], HEADER_LEN);
        let first = chunks.next_chunk()?;
        match first.tag.kind() {
            ChunkKind::Lossy | ChunkKind::Lossless | ChunkKind::Extended => {}
            _ => {
                return Err(DecodeError::MalformedContainer(alloc::format!(
                    "invalid first chunk {}",
                    first.tag
                )));
            }
        }
        self.state.first = first;
        self.state.cursor = chunks.offset();
        Ok(())
    }

    fn decode_first_chunk_header(&mut self) -> Result<(), DecodeError> {
        let first = self.state.first;
        let (width, height, has_alpha) = match first.tag.kind() {
            ChunkKind::Lossy => {
                let header = LossyHeader::parse(first.payload)?;
                (u32::from(header.width), u32::from(header.height), false)
            }
            ChunkKind::Lossless => {
                let (header, _) = LosslessHeader::parse(first.payload)?;
                (header.width, header.height, header.alpha_is_used)
            }
            _ => {
                let header = ExtendedHeader::parse(first.payload)?;
                self.state.extended = header;
                (header.canvas_width, header.canvas_height, header.has_alpha)
            }
        };
        self.state.width = width;
        self.state.height = height;
        self.state.has_alpha = has_alpha;
        Ok(())
    }

    fn classify_chunks(&mut self) -> Result<(), DecodeError> {
        if self.extended() {
            let cursor = self.state.cursor;
            let rest = ChunkReader::with_base(&self.state.body[cursor..], cursor);
            self.state.chunks = classify(rest, &self.state.extended)?;
        } else {
            self.state.chunks.image = Some(ImageData::new(None, Some(self.state.first))?);
        }
        Ok(())
    }

    fn decode_animation_headers(&mut self) -> Result<(), DecodeError> {
        if !self.animated() {
            return Ok(());
        }
        let Some(anim) = self.state.chunks.animation_header else {
            return Err(DecodeError::inconsistent("missing 'ANIM' chunk"));
        };
        self.state.animation = AnimationHeader::parse(anim.payload)?;

        let (w, h) = (self.state.width, self.state.height);
        self.state.frames = self
            .state
            .chunks
            .frames
            .iter()
            .map(|chunk| FrameHeader::parse(chunk.payload, w, h))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(())
    }

    /// Produce frame `index` into the canvas or the still cache; returns the
    /// frame duration.
    fn render(&mut self, index: usize) -> Result<u32, DecodeError> {
        self.ensure(Phase::AnimationHeadersDecoded)?;

        let duration_ms = if self.animated() {
            let state = &mut self.state;
            let anim = Animation {
                header: &state.animation,
                frames: &state.frames,
                canvas_width: state.width,
                canvas_height: state.height,
                lossless: &self.lossless,
                limits: &self.limits,
            };
            state.compositor.render(index, &anim)?
        } else {
            if self.state.still.is_none() {
                self.state.still = Some(self.decode_still()?);
            }
            0
        };

        self.advance(Phase::FrameRendered);
        Ok(duration_ms)
    }

    fn decode_still(&self) -> Result<Bitmap, DecodeError> {
        let Some(image) = self.state.chunks.image else {
            return Err(DecodeError::inconsistent("missing image data"));
        };
        let bitmap = decode_image_data(&image, &self.lossless, &self.limits)?;
        if self.extended()
            && (bitmap.width() != self.state.width || bitmap.height() != self.state.height)
        {
            return Err(DecodeError::InconsistentHeader(alloc::format!(
                "'VP8X' canvas is {}x{} but the image is {}x{}",
                self.state.width,
                self.state.height,
                bitmap.width(),
                bitmap.height()
            )));
        }
        Ok(bitmap)
    }
}

/// Every frame of a file, as handed to a client that wants the whole image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    pub is_animated: bool,
    pub loop_count: u32,
    /// One entry per frame; `None` where that frame failed to decode.
    pub frames: Vec<Option<DecodedFrame>>,
}

/// Decode all frames of `data`.
///
/// Returns `None` if `data` is not a RIFF/WebP file or its frame count
/// cannot be determined. A file whose headers fail to parse therefore
/// yields `None`, not a single failed frame. Frames that fail are recorded
/// as `None`.
pub fn decode_all<L: LosslessDecode>(data: &[u8], lossless: L) -> Option<DecodedImage> {
    if !container::probe(data) {
        log::debug!("not a RIFF/WebP buffer");
        return None;
    }
    let mut decoder = WebpDecoder::new(data).with_lossless(lossless);
    let count = match decoder.frame_count() {
        Ok(0) | Err(_) => {
            log::debug!("could not decode any frame");
            return None;
        }
        Ok(count) => count,
    };
    let is_animated = decoder.is_animated().unwrap_or(false);
    let loop_count = decoder.loop_count().unwrap_or(0);
    let frames = (0..count)
        .map(|i| decoder.frame(i).ok().map(Frame::into_owned))
        .collect();
    Some(DecodedImage {
        is_animated,
        loop_count,
        frames,
    })
}
