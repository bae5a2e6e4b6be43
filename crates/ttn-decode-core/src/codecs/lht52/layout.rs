use std::ops::Range;

pub const RESET_LEN: usize = 0;
pub const FRAME_LEN: usize = 11;
pub const EXPECTED_LENGTHS: &str = "0 or 11";

pub const TEMPERATURE_RANGE: Range<usize> = 0..2;
pub const HUMIDITY_RANGE: Range<usize> = 2..4;
/// Extension sensor bytes; not interpreted.
pub const RESERVED_RANGE: Range<usize> = 4..7;
pub const TIMESTAMP_RANGE: Range<usize> = 7..11;

pub const TEMPERATURE_DIVISOR: f64 = 100.0;
pub const HUMIDITY_DIVISOR: f64 = 10.0;
