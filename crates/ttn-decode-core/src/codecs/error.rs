use serde::Serialize;
use thiserror::Error;

use super::DeviceModel;

/// Errors returned when a frame cannot be read under a device layout.
///
/// Every variant is terminal for the frame being decoded and never for the
/// batch it came from.
///
/// # Examples
/// ```
/// use ttn_decode_core::{DecodeErrorKind, EncodedFrame, decode_lwl02};
///
/// let err = decode_lwl02(&EncodedFrame::new("TGwD")).unwrap_err();
/// assert_eq!(err.kind(), DecodeErrorKind::InvalidLength);
/// assert!(err.to_string().contains("invalid lwl02 frame length"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid base64 frame: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("invalid {model} frame length: got {actual} bytes, expected {expected}")]
    InvalidLength {
        model: DeviceModel,
        actual: usize,
        expected: &'static str,
    },
    #[error("frame truncated: need {needed} bytes, got {actual}")]
    Truncated { needed: usize, actual: usize },
    #[error("unexpected model tag: expected {expected:#04x}, got {actual:#04x}")]
    UnexpectedModel { expected: u8, actual: u8 },
    #[error("timestamp out of range: {seconds}s since epoch")]
    InvalidTimestamp { seconds: i64 },
}

impl DecodeError {
    pub fn kind(&self) -> DecodeErrorKind {
        match self {
            DecodeError::Encoding(_) => DecodeErrorKind::Encoding,
            DecodeError::InvalidLength { .. } => DecodeErrorKind::InvalidLength,
            DecodeError::Truncated { .. } => DecodeErrorKind::Truncated,
            DecodeError::UnexpectedModel { .. } => DecodeErrorKind::UnexpectedModel,
            DecodeError::InvalidTimestamp { .. } => DecodeErrorKind::InvalidTimestamp,
        }
    }
}

/// Stable, serializable classification of a [`DecodeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeErrorKind {
    Encoding,
    InvalidLength,
    Truncated,
    UnexpectedModel,
    InvalidTimestamp,
}

impl DecodeErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DecodeErrorKind::Encoding => "encoding",
            DecodeErrorKind::InvalidLength => "invalid_length",
            DecodeErrorKind::Truncated => "truncated",
            DecodeErrorKind::UnexpectedModel => "unexpected_model",
            DecodeErrorKind::InvalidTimestamp => "invalid_timestamp",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown device model '{value}' (expected one of: lht52, lwl02)")]
pub struct ParseModelError {
    pub value: String,
}
