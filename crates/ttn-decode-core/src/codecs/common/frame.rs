use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::codecs::error::DecodeError;

/// Base64 text of a device frame, as carried in `frm_payload`.
///
/// The text is not validated until a codec decodes it; an absent payload is
/// the empty string.
///
/// # Examples
/// ```
/// use ttn_decode_core::EncodedFrame;
///
/// let frame = EncodedFrame::new("TGwCAAALAAAiAA==");
/// assert_eq!(frame.decode_bytes()?.len(), 10);
/// assert!(EncodedFrame::default().decode_bytes()?.is_empty());
/// # Ok::<(), ttn_decode_core::DecodeError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedFrame(String);

impl EncodedFrame {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode the standard (padded, non URL-safe) base64 text into raw bytes.
    pub fn decode_bytes(&self) -> Result<Vec<u8>, DecodeError> {
        Ok(STANDARD.decode(self.0.as_bytes())?)
    }
}

impl From<&str> for EncodedFrame {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EncodedFrame {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for EncodedFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
