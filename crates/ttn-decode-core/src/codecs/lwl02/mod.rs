//! Dragino LWL02 door/water-leak sensor.
//!
//! Frame layout (big-endian):
//!
//! | bytes | field                                   |
//! |-------|-----------------------------------------|
//! | 0..2  | status bits (top 2) and battery mV      |
//! | 2     | model tag, always `0x02`                |
//! | 3..6  | total water leak events                 |
//! | 6     | alarm status                            |
//!
//! Only the battery voltage is decoded. The leak counter
//! ([`layout::LEAK_EVENTS_RANGE`]) and alarm byte ([`layout::ALARM_OFFSET`])
//! are length-checked but not interpreted, so [`LeakStatus`] stays `Unknown`.

pub mod layout;
pub mod parser;
pub mod reader;

pub use parser::{LeakStatus, Lwl02Reading, decode_lwl02, parse_lwl02};
