//! Helpers shared by every codec: the encoded frame wrapper and the
//! bounds-checked big-endian reader.

pub mod frame;
pub(crate) mod reader;
