//! Dragino LHT52 temperature/humidity sensor.
//!
//! Uplinks are either empty (the device's boot/rejoin signal, decoded as
//! [`Lht52Reading::Reset`]) or exactly 11 bytes carrying a signed temperature
//! in hundredths of a degree Celsius, a signed relative humidity in tenths of
//! a percent and a signed 32-bit Unix timestamp. Any other length is rejected.
//! Fahrenheit is derived from Celsius at construction and never decoded.

pub mod layout;
pub mod parser;
pub mod reader;

pub use parser::{Lht52EventKind, Lht52Measurement, Lht52Reading, decode_lht52, parse_lht52};
