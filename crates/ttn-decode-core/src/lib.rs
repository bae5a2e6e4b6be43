//! ttn-decode core library: LoRaWAN uplink frame decoding.
//!
//! This crate turns network-server uplink events into typed sensor readings.
//! Sources parse The Things Network event JSON into envelopes, the dispatch
//! layer routes each envelope to a device codec (layout/reader/parser) by
//! event name and FPort, and the report layer collects one outcome per
//! envelope into a serializable report. Codecs and dispatch are pure; all
//! I/O is isolated in `source`.
//!
//! Invariants:
//! - A frame decodes to exactly one reading or exactly one decode error.
//! - N envelopes in, N outcomes out, in input order; a failed frame never
//!   affects its neighbours.
//! - Multi-byte fields are big-endian; scaled values are derived once.
//!
//! # Examples
//! ```
//! use ttn_decode_core::{EventEnvelope, RouteTable, SensorReading, route};
//!
//! let batch = vec![EventEnvelope::uplink("eui-a840416c81850cd1", 2, "+GMCqn//AWh6dYY=")];
//! let outcomes = route(&RouteTable::default(), &batch);
//! match outcomes[0].reading() {
//!     Some(SensorReading::Lht52(reading)) => {
//!         let m = reading.measurement().expect("measurement");
//!         assert_eq!(m.temperature_celsius(), -19.49);
//!     }
//!     other => panic!("unexpected outcome: {other:?}"),
//! }
//! ```

use std::path::Path;

use serde::Serialize;
use thiserror::Error;

pub mod codecs;
mod dispatch;
mod report;
mod source;

pub use codecs::{
    DecodeError, DecodeErrorKind, DeviceModel, EncodedFrame, LeakStatus, Lht52EventKind,
    Lht52Measurement, Lht52Reading, Lwl02Reading, ParseModelError, SensorReading, decode_lht52,
    decode_lwl02,
};
pub use dispatch::{
    IgnoreReason, LHT52_DEFAULT_PORT, Outcome, OutcomeStatus, RouteEntry, RouteTable,
    RouteTableError, Selection, UPLINK_FORWARD_EVENT, route, route_one,
};
pub use report::build_report;
pub use source::{
    DeviceIdentifiers, EventEnvelope, SourceError, UplinkFrame, parse_events, read_events_file,
};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;

/// Decoded batch report with one record per input envelope.
///
/// # Examples
/// ```
/// use ttn_decode_core::make_stub_report;
///
/// let report = make_stub_report("events.json", 123);
/// assert_eq!(report.report_version, ttn_decode_core::REPORT_VERSION);
/// assert!(report.outcomes.is_empty());
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// Input batch metadata.
    pub input: InputInfo,
    /// Per-status outcome counts.
    pub summary: BatchSummary,
    /// One record per envelope, in input order.
    pub outcomes: Vec<OutcomeRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputInfo {
    /// Input path as provided to the decoder.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub envelopes_total: u64,
    pub decoded: u64,
    pub ignored: u64,
    pub failed: u64,
}

/// Outcome of a single envelope.
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeRecord {
    /// Position of the envelope in the input batch.
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_eui: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
    /// LoRaWAN FPort. The Things Stack omits a zero FPort, so `0` also
    /// stands for "absent".
    pub port: u8,
    /// RFC3339 receive time, when the network server reported one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received_at: Option<String>,
    pub status: OutcomeStatus,
    /// Codec that handled (or rejected) the frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<DeviceModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading: Option<SensorReading>,
    /// Human-readable reason for ignored envelopes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    pub kind: DecodeErrorKind,
    pub message: String,
}

impl From<&DecodeError> for ErrorRecord {
    fn from(error: &DecodeError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Build a report with base fields filled and no outcomes.
pub fn make_stub_report(input_path: &str, input_bytes: u64) -> BatchReport {
    BatchReport {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "ttn-decode".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        summary: BatchSummary::default(),
        outcomes: vec![],
    }
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

/// Read a TTN event file, route every envelope and build the report.
pub fn decode_events_file(path: &Path, routes: &RouteTable) -> Result<BatchReport, BatchError> {
    let envelopes = read_events_file(path)?;
    let outcomes = route(routes, &envelopes);
    Ok(build_report(
        &path.display().to_string(),
        path.metadata()?.len(),
        &envelopes,
        &outcomes,
    ))
}
