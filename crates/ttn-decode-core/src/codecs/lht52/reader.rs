use time::OffsetDateTime;

use super::layout;
use crate::codecs::common::reader::FrameReader;
use crate::codecs::error::DecodeError;

pub struct Lht52Reader<'a> {
    inner: FrameReader<'a>,
}

impl<'a> Lht52Reader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self {
            inner: FrameReader::new(payload),
        }
    }

    pub fn frame_len(&self) -> usize {
        self.inner.frame_len()
    }

    pub fn read_temperature_celsius(&self) -> Result<f64, DecodeError> {
        let raw = self.inner.read_i16_be(layout::TEMPERATURE_RANGE)?;
        Ok(f64::from(raw) / layout::TEMPERATURE_DIVISOR)
    }

    pub fn read_humidity_percent(&self) -> Result<f64, DecodeError> {
        let raw = self.inner.read_i16_be(layout::HUMIDITY_RANGE)?;
        Ok(f64::from(raw) / layout::HUMIDITY_DIVISOR)
    }

    pub fn read_observed_at(&self) -> Result<OffsetDateTime, DecodeError> {
        let seconds = i64::from(self.inner.read_i32_be(layout::TIMESTAMP_RANGE)?);
        OffsetDateTime::from_unix_timestamp(seconds)
            .map_err(|_| DecodeError::InvalidTimestamp { seconds })
    }
}
