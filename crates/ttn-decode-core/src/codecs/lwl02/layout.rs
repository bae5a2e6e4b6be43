use std::ops::Range;

pub const MIN_LEN: usize = 7;
pub const EXPECTED_LENGTHS: &str = "at least 7";

pub const STATUS_RANGE: Range<usize> = 0..2;
pub const MODEL_OFFSET: usize = 2;
pub const LEAK_EVENTS_RANGE: Range<usize> = 3..6;
pub const ALARM_OFFSET: usize = 6;

pub const MODEL_TAG: u8 = 0x02;
pub const BATTERY_MASK: u16 = 0x3fff;
pub const BATTERY_DIVISOR: f64 = 1000.0;
