//! RIFF envelope validation.
//!
//! Layout: `RIFF` + u32 LE size + `WEBP`, where size counts every byte
//! after the size field (the `WEBP` magic included).

use crate::error::DecodeError;
use crate::tag::Tag;

/// Length of the `RIFF` + size + `WEBP` prefix.
pub(crate) const HEADER_LEN: usize = 12;

/// Largest declared size the format allows (2^32 - 10).
const MAX_DECLARED_SIZE: u32 = u32::MAX - 9;

/// Validate the container header and return the buffer trimmed to the
/// declared size. Trailing bytes past the declared size are ignored.
pub(crate) fn validate(data: &[u8]) -> Result<&[u8], DecodeError> {
    let total = declared_total(data)?;
    if data.len() < total {
        return Err(DecodeError::MalformedContainer(alloc::format!(
            "truncated: header declares {total} bytes, buffer has {}",
            data.len()
        )));
    }
    if data.len() > total {
        log::debug!(
            "buffer has {} bytes but header declares {total}; trimming",
            data.len()
        );
    }
    Ok(&data[..total])
}

/// Check the 12-byte header and return the total file length it declares.
fn declared_total(data: &[u8]) -> Result<usize, DecodeError> {
    if data.len() < HEADER_LEN {
        return Err(DecodeError::container("missing RIFF/WEBP header"));
    }
    if Tag::from_slice(&data[0..4]) != Some(Tag::RIFF)
        || Tag::from_slice(&data[8..12]) != Some(Tag::WEBP)
    {
        return Err(DecodeError::container("invalid RIFF/WEBP magic"));
    }

    let declared = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
    if declared > MAX_DECLARED_SIZE {
        return Err(DecodeError::MalformedContainer(alloc::format!(
            "declared size {declared} over maximum {MAX_DECLARED_SIZE}"
        )));
    }
    if declared < 4 {
        return Err(DecodeError::MalformedContainer(alloc::format!(
            "declared size {declared} too small for the WEBP magic"
        )));
    }

    // usize is at least 32 bits on every supported target
    Ok(8 + declared as usize)
}

/// Check whether `data` starts with a valid RIFF/WEBP header.
///
/// Only the first 12 bytes are inspected; a truncated body still probes
/// true. Stateless and safe to call from any thread.
pub fn probe(data: &[u8]) -> bool {
    declared_total(data).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(size: u32) -> alloc::vec::Vec<u8> {
        let mut v = b"RIFF".to_vec();
        v.extend_from_slice(&size.to_le_bytes());
        v.extend_from_slice(b"WEBP");
        v
    }

    #[test]
    fn declared_size_bounds() {
        assert!(validate(&header(4)).is_ok());
        assert!(matches!(
            validate(&header(3)),
            Err(DecodeError::MalformedContainer(_))
        ));
        assert!(matches!(
            validate(&header(u32::MAX - 8)),
            Err(DecodeError::MalformedContainer(_))
        ));
    }

    #[test]
    fn trailing_bytes_are_trimmed() {
        let mut data = header(4);
        data.extend_from_slice(b"junk");
        assert_eq!(validate(&data).map(<[u8]>::len), Ok(12));
    }

    #[test]
    fn probe_ignores_truncated_body() {
        let data = header(100);
        assert!(probe(&data));
        assert!(validate(&data).is_err());
        assert!(!probe(&data[..11]));
    }
}
