use serde::Serialize;
use time::OffsetDateTime;

use super::layout;
use super::reader::Lht52Reader;
use crate::codecs::DeviceModel;
use crate::codecs::common::frame::EncodedFrame;
use crate::codecs::error::DecodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Lht52EventKind {
    Reset,
    TemperatureHumidity,
}

/// A decoded LHT52 uplink.
///
/// A reset carries no measurement, so it cannot be mistaken for a zero
/// reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event_kind", rename_all = "snake_case")]
pub enum Lht52Reading {
    Reset,
    TemperatureHumidity(Lht52Measurement),
}

impl Lht52Reading {
    pub fn event_kind(&self) -> Lht52EventKind {
        match self {
            Lht52Reading::Reset => Lht52EventKind::Reset,
            Lht52Reading::TemperatureHumidity(_) => Lht52EventKind::TemperatureHumidity,
        }
    }

    pub fn measurement(&self) -> Option<&Lht52Measurement> {
        match self {
            Lht52Reading::Reset => None,
            Lht52Reading::TemperatureHumidity(measurement) => Some(measurement),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lht52Measurement {
    temperature_celsius: f64,
    temperature_fahrenheit: f64,
    humidity_percent: f64,
    #[serde(with = "time::serde::rfc3339")]
    observed_at: OffsetDateTime,
}

impl Lht52Measurement {
    pub fn new(temperature_celsius: f64, humidity_percent: f64, observed_at: OffsetDateTime) -> Self {
        Self {
            temperature_celsius,
            temperature_fahrenheit: celsius_to_fahrenheit(temperature_celsius),
            humidity_percent,
            observed_at,
        }
    }

    pub fn temperature_celsius(&self) -> f64 {
        self.temperature_celsius
    }

    pub fn temperature_fahrenheit(&self) -> f64 {
        self.temperature_fahrenheit
    }

    pub fn humidity_percent(&self) -> f64 {
        self.humidity_percent
    }

    pub fn observed_at(&self) -> OffsetDateTime {
        self.observed_at
    }
}

fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn decode_lht52(frame: &EncodedFrame) -> Result<Lht52Reading, DecodeError> {
    let bytes = frame.decode_bytes()?;
    parse_lht52(&bytes)
}

pub fn parse_lht52(payload: &[u8]) -> Result<Lht52Reading, DecodeError> {
    let reader = Lht52Reader::new(payload);
    match reader.frame_len() {
        layout::RESET_LEN => return Ok(Lht52Reading::Reset),
        layout::FRAME_LEN => {}
        actual => {
            return Err(DecodeError::InvalidLength {
                model: DeviceModel::Lht52,
                actual,
                expected: layout::EXPECTED_LENGTHS,
            });
        }
    }

    let temperature_celsius = reader.read_temperature_celsius()?;
    let humidity_percent = reader.read_humidity_percent()?;
    let observed_at = reader.read_observed_at()?;

    Ok(Lht52Reading::TemperatureHumidity(Lht52Measurement::new(
        temperature_celsius,
        humidity_percent,
        observed_at,
    )))
}
