use std::ops::Range;

use crate::codecs::error::DecodeError;

/// Bounds-checked big-endian access to a decoded frame.
///
/// Every read reports [`DecodeError::Truncated`] instead of panicking when a
/// field extends past the end of the buffer.
pub(crate) struct FrameReader<'a> {
    payload: &'a [u8],
}

impl<'a> FrameReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload }
    }

    pub fn frame_len(&self) -> usize {
        self.payload.len()
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, DecodeError> {
        self.payload
            .get(offset)
            .copied()
            .ok_or(DecodeError::Truncated {
                needed: offset + 1,
                actual: self.payload.len(),
            })
    }

    pub fn read_slice(&self, range: Range<usize>) -> Result<&'a [u8], DecodeError> {
        self.payload.get(range.clone()).ok_or(DecodeError::Truncated {
            needed: range.end,
            actual: self.payload.len(),
        })
    }

    pub fn read_u16_be(&self, range: Range<usize>) -> Result<u16, DecodeError> {
        Ok(u16::from_be_bytes(self.read_array(range)?))
    }

    pub fn read_i16_be(&self, range: Range<usize>) -> Result<i16, DecodeError> {
        Ok(i16::from_be_bytes(self.read_array(range)?))
    }

    pub fn read_i32_be(&self, range: Range<usize>) -> Result<i32, DecodeError> {
        Ok(i32::from_be_bytes(self.read_array(range)?))
    }

    fn read_array<const N: usize>(&self, range: Range<usize>) -> Result<[u8; N], DecodeError> {
        let bytes = self.read_slice(range)?;
        bytes.try_into().map_err(|_| DecodeError::Truncated {
            needed: N,
            actual: bytes.len(),
        })
    }
}
