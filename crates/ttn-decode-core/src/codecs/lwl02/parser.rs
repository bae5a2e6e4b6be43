use serde::Serialize;

use super::layout;
use super::reader::Lwl02Reader;
use crate::codecs::DeviceModel;
use crate::codecs::common::frame::EncodedFrame;
use crate::codecs::error::DecodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeakStatus {
    #[default]
    Unknown,
    Detected,
    Cleared,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lwl02Reading {
    pub battery_voltage: f64,
    pub leak_status: LeakStatus,
}

pub fn decode_lwl02(frame: &EncodedFrame) -> Result<Lwl02Reading, DecodeError> {
    let bytes = frame.decode_bytes()?;
    parse_lwl02(&bytes)
}

pub fn parse_lwl02(payload: &[u8]) -> Result<Lwl02Reading, DecodeError> {
    let reader = Lwl02Reader::new(payload);
    if reader.frame_len() < layout::MIN_LEN {
        return Err(DecodeError::InvalidLength {
            model: DeviceModel::Lwl02,
            actual: reader.frame_len(),
            expected: layout::EXPECTED_LENGTHS,
        });
    }

    let battery_voltage = reader.read_battery_voltage()?;
    let model = reader.read_model_tag()?;
    if model != layout::MODEL_TAG {
        return Err(DecodeError::UnexpectedModel {
            expected: layout::MODEL_TAG,
            actual: model,
        });
    }

    Ok(Lwl02Reading {
        battery_voltage,
        leak_status: LeakStatus::Unknown,
    })
}
