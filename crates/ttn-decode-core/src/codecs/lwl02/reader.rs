use super::layout;
use crate::codecs::common::reader::FrameReader;
use crate::codecs::error::DecodeError;

pub struct Lwl02Reader<'a> {
    inner: FrameReader<'a>,
}

impl<'a> Lwl02Reader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self {
            inner: FrameReader::new(payload),
        }
    }

    pub fn frame_len(&self) -> usize {
        self.inner.frame_len()
    }

    /// Battery voltage from the low 14 bits of the status word; the top two
    /// bits are status flags.
    pub fn read_battery_voltage(&self) -> Result<f64, DecodeError> {
        let status = self.inner.read_u16_be(layout::STATUS_RANGE)?;
        Ok(f64::from(status & layout::BATTERY_MASK) / layout::BATTERY_DIVISOR)
    }

    pub fn read_model_tag(&self) -> Result<u8, DecodeError> {
        self.inner.read_u8(layout::MODEL_OFFSET)
    }
}
