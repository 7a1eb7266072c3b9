use alloc::string::String;

/// Errors from RIFF/WebP decoding.
///
/// The decoder caches the first error it hits and hands back a clone of it
/// on every later query, so the enum is `Clone + Eq`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// Bad `RIFF`/`WEBP` magic, declared size out of range, truncated
    /// buffer, or an unrecognised first chunk.
    #[error("malformed container: {0}")]
    MalformedContainer(String),

    /// Chunk length overruns the buffer, non-zero pad byte, or a payload
    /// shorter than the fields it must carry.
    #[error("malformed chunk: {0}")]
    MalformedChunk(String),

    /// Headers that disagree with each other or with the decoded pixels.
    #[error("inconsistent header: {0}")]
    InconsistentHeader(String),

    /// A chunk that must precede the image data comes after it.
    #[error("chunk ordering violation: {0}")]
    OrderingViolation(String),

    /// Valid input that this decoder does not handle.
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("frame index {index} out of range (frame count {count})")]
    FrameIndexOutOfRange { index: usize, count: usize },

    /// Failure reported by the lossless bitstream decoder.
    #[error("lossless bitstream: {0}")]
    Lossless(String),
}

impl DecodeError {
    pub(crate) fn container(msg: &str) -> Self {
        Self::MalformedContainer(msg.into())
    }

    pub(crate) fn chunk(msg: &str) -> Self {
        Self::MalformedChunk(msg.into())
    }

    pub(crate) fn inconsistent(msg: &str) -> Self {
        Self::InconsistentHeader(msg.into())
    }

    pub(crate) fn unsupported(msg: &str) -> Self {
        Self::UnsupportedFeature(msg.into())
    }
}
