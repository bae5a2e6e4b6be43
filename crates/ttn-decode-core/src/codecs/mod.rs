//! Device frame codecs.
//!
//! Each supported device model gets its own module with a layered structure:
//! - `layout`: byte offsets, frame lengths and scale factors (source of truth)
//! - `reader`: bounds-checked big-endian reads and unit conventions
//! - `parser`: domain-level decoding (no direct byte indexing)
//!
//! Base64 handling and the shared byte reader live in `common`; every codec
//! reports failures through [`DecodeError`]. Codecs are pure functions with no
//! I/O and no shared state.
//!
//! The set of models is closed: adding a device means adding a
//! [`DeviceModel`] variant, a [`SensorReading`] variant and a codec module.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

pub mod common;
pub mod error;
pub mod lht52;
pub mod lwl02;

pub use common::frame::EncodedFrame;
pub use error::{DecodeError, DecodeErrorKind, ParseModelError};
pub use lht52::{Lht52EventKind, Lht52Measurement, Lht52Reading, decode_lht52};
pub use lwl02::{LeakStatus, Lwl02Reading, decode_lwl02};

/// Supported device models.
///
/// # Examples
/// ```
/// use ttn_decode_core::DeviceModel;
///
/// let model: DeviceModel = "lht52".parse()?;
/// assert_eq!(model, DeviceModel::Lht52);
/// assert_eq!(model.to_string(), "lht52");
/// # Ok::<(), ttn_decode_core::ParseModelError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceModel {
    /// Dragino LHT52 temperature/humidity sensor.
    Lht52,
    /// Dragino LWL02 door/water-leak sensor.
    Lwl02,
}

impl DeviceModel {
    pub const ALL: [DeviceModel; 2] = [DeviceModel::Lht52, DeviceModel::Lwl02];

    pub fn name(self) -> &'static str {
        match self {
            DeviceModel::Lht52 => "lht52",
            DeviceModel::Lwl02 => "lwl02",
        }
    }

    /// Decode a frame with this model's codec.
    pub fn decode(self, frame: &EncodedFrame) -> Result<SensorReading, DecodeError> {
        match self {
            DeviceModel::Lht52 => decode_lht52(frame).map(SensorReading::Lht52),
            DeviceModel::Lwl02 => decode_lwl02(frame).map(SensorReading::Lwl02),
        }
    }
}

impl fmt::Display for DeviceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DeviceModel {
    type Err = ParseModelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        DeviceModel::ALL
            .into_iter()
            .find(|model| model.name().eq_ignore_ascii_case(value))
            .ok_or_else(|| ParseModelError {
                value: value.to_string(),
            })
    }
}

/// A decoded reading, one variant per device model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SensorReading {
    Lht52(Lht52Reading),
    Lwl02(Lwl02Reading),
}

impl SensorReading {
    pub fn model(&self) -> DeviceModel {
        match self {
            SensorReading::Lht52(_) => DeviceModel::Lht52,
            SensorReading::Lwl02(_) => DeviceModel::Lwl02,
        }
    }
}
