//! The Things Network (v3) event JSON.
//!
//! Two shapes are accepted: the live-data export, an array of event records
//! (`{"name": ..., "time": ..., "identifiers": [...], "data": {...}}`), and a
//! single webhook body, which is the bare `ApplicationUp` message without an
//! event name. Only the fields the decoders need are modelled; everything
//! else is ignored.

use serde::Deserialize;
use serde_json::Value;
use time::OffsetDateTime;
use tracing::debug;

use super::{DeviceIdentifiers, EventEnvelope, SourceError, UplinkFrame};
use crate::codecs::EncodedFrame;
use crate::dispatch::UPLINK_FORWARD_EVENT;

#[derive(Debug, Deserialize)]
struct EventRecord {
    name: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    time: Option<OffsetDateTime>,
    #[serde(default)]
    identifiers: Vec<RecordIdentifiers>,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Default, Deserialize)]
struct RecordIdentifiers {
    #[serde(default)]
    device_ids: Option<EndDeviceIds>,
}

#[derive(Debug, Default, Deserialize)]
struct ApplicationUp {
    #[serde(default)]
    end_device_ids: Option<EndDeviceIds>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    received_at: Option<OffsetDateTime>,
    #[serde(default)]
    uplink_message: Option<UplinkMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct EndDeviceIds {
    #[serde(default)]
    device_id: String,
    #[serde(default)]
    dev_eui: Option<String>,
    #[serde(default)]
    application_ids: Option<ApplicationIds>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ApplicationIds {
    #[serde(default)]
    application_id: String,
}

#[derive(Debug, Default, Deserialize)]
struct UplinkMessage {
    #[serde(default)]
    f_port: Option<u8>,
    #[serde(default)]
    frm_payload: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    received_at: Option<OffsetDateTime>,
}

pub(super) fn parse_batch(json: &str) -> Result<Vec<EventEnvelope>, SourceError> {
    let batch: Value = serde_json::from_str(json).map_err(SourceError::Json)?;
    let values = match batch {
        Value::Array(values) => values,
        value => vec![value],
    };
    Ok(values
        .into_iter()
        .enumerate()
        .map(|(index, value)| parse_event(index, value))
        .collect())
}

fn parse_event(index: usize, value: Value) -> EventEnvelope {
    let event_name = match value.get("name") {
        None => UPLINK_FORWARD_EVENT.to_string(),
        Some(Value::String(name)) => name.clone(),
        Some(other) => other.to_string(),
    };
    let device_id = salvage_device_id(&value);

    match read_event(value) {
        Ok(envelope) => envelope,
        Err(error) => {
            debug!(index, %error, "event record does not match the TTN schema");
            EventEnvelope {
                event_name,
                device: DeviceIdentifiers {
                    device_id,
                    ..DeviceIdentifiers::default()
                },
                frame: UplinkFrame::default(),
                schema_error: Some(error.to_string()),
            }
        }
    }
}

fn read_event(value: Value) -> Result<EventEnvelope, serde_json::Error> {
    if value.get("name").is_none() {
        let up: ApplicationUp = serde_json::from_value(value)?;
        return Ok(envelope_from_up(UPLINK_FORWARD_EVENT.to_string(), up, None, None));
    }

    let record: EventRecord = serde_json::from_value(value)?;
    let fallback_ids = record
        .identifiers
        .into_iter()
        .find_map(|ids| ids.device_ids);

    // Only uplink data must match the ApplicationUp schema; other events
    // carry unrelated payloads and are kept for their name alone.
    let up = if record.name == UPLINK_FORWARD_EVENT {
        serde_json::from_value(record.data)?
    } else {
        serde_json::from_value(record.data).unwrap_or_default()
    };

    Ok(envelope_from_up(record.name, up, fallback_ids, record.time))
}

/// Best-effort device id of a record that failed to parse.
fn salvage_device_id(value: &Value) -> String {
    [
        "/end_device_ids/device_id",
        "/data/end_device_ids/device_id",
        "/identifiers/0/device_ids/device_id",
    ]
    .iter()
    .find_map(|pointer| value.pointer(pointer).and_then(Value::as_str))
    .unwrap_or_default()
    .to_string()
}

fn envelope_from_up(
    event_name: String,
    up: ApplicationUp,
    fallback_ids: Option<EndDeviceIds>,
    event_time: Option<OffsetDateTime>,
) -> EventEnvelope {
    let ids = up.end_device_ids.or(fallback_ids).unwrap_or_default();
    let uplink = up.uplink_message.unwrap_or_default();

    EventEnvelope {
        event_name,
        device: DeviceIdentifiers {
            device_id: ids.device_id,
            dev_eui: ids.dev_eui,
            application_id: ids
                .application_ids
                .map(|app| app.application_id)
                .filter(|id| !id.is_empty()),
        },
        frame: UplinkFrame {
            port: uplink.f_port.unwrap_or_default(),
            payload: EncodedFrame::new(uplink.frm_payload.unwrap_or_default()),
            received_at: uplink.received_at.or(up.received_at).or(event_time),
        },
        schema_error: None,
    }
}
