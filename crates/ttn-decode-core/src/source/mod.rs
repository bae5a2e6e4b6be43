//! Event sources.
//!
//! Sources turn network-server JSON into [`EventEnvelope`]s, the read-only
//! input of the dispatch layer. All file I/O and JSON handling lives here so
//! codecs and dispatch stay pure. Only a document that is not JSON at all is
//! a source error. A record that does not match the event schema still
//! yields an envelope, carrying the schema error for dispatch to report, and
//! a missing or empty `frm_payload` becomes an empty [`EncodedFrame`] judged
//! by the codec.

mod ttn;

use std::fs;
use std::path::Path;

use thiserror::Error;
use time::OffsetDateTime;

use crate::codecs::EncodedFrame;

/// Identifiers of the end device that sent a frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceIdentifiers {
    pub device_id: String,
    pub dev_eui: Option<String>,
    pub application_id: Option<String>,
}

/// The application payload of an uplink plus its LoRaWAN metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UplinkFrame {
    /// LoRaWAN FPort; `0` when the message carried none.
    pub port: u8,
    pub payload: EncodedFrame,
    pub received_at: Option<OffsetDateTime>,
}

/// One network-server event, as consumed by the dispatch layer.
///
/// # Examples
/// ```
/// use ttn_decode_core::{EventEnvelope, UPLINK_FORWARD_EVENT};
///
/// let envelope = EventEnvelope::uplink("eui-1", 2, "");
/// assert_eq!(envelope.event_name, UPLINK_FORWARD_EVENT);
/// assert!(envelope.frame.payload.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventEnvelope {
    pub event_name: String,
    pub device: DeviceIdentifiers,
    pub frame: UplinkFrame,
    /// Set when the record could not be read; such envelopes are reported,
    /// never decoded.
    pub schema_error: Option<String>,
}

impl EventEnvelope {
    /// Build an uplink-forward envelope without a receive timestamp.
    pub fn uplink(device_id: &str, port: u8, payload: &str) -> Self {
        Self {
            event_name: crate::dispatch::UPLINK_FORWARD_EVENT.to_string(),
            device: DeviceIdentifiers {
                device_id: device_id.to_string(),
                ..DeviceIdentifiers::default()
            },
            frame: UplinkFrame {
                port,
                payload: EncodedFrame::new(payload),
                received_at: None,
            },
            schema_error: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid event JSON: {0}")]
    Json(#[source] serde_json::Error),
}

/// Parse The Things Network event JSON: a live-data export (array of event
/// records) or a single webhook body.
pub fn parse_events(json: &str) -> Result<Vec<EventEnvelope>, SourceError> {
    ttn::parse_batch(json)
}

pub fn read_events_file(path: &Path) -> Result<Vec<EventEnvelope>, SourceError> {
    let json = fs::read_to_string(path)?;
    parse_events(&json)
}
