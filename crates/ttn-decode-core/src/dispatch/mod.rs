//! Event dispatch.
//!
//! Routing classifies each envelope by event name, picks a codec from the
//! [`RouteTable`] by FPort and records exactly one [`Outcome`] per envelope,
//! in input order. Decode failures are data: one bad frame never stops the
//! rest of the batch.

mod routes;

use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::codecs::{DecodeError, DeviceModel, SensorReading};
use crate::source::EventEnvelope;

pub use routes::{LHT52_DEFAULT_PORT, RouteEntry, RouteTable, RouteTableError, Selection};

/// Event name of application uplinks forwarded by The Things Stack.
pub const UPLINK_FORWARD_EVENT: &str = "as.up.data.forward";

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Decoded {
        model: DeviceModel,
        reading: SensorReading,
    },
    Ignored(IgnoreReason),
    Failed {
        model: DeviceModel,
        error: DecodeError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Decoded,
    Ignored,
    Failed,
}

impl Outcome {
    pub fn status(&self) -> OutcomeStatus {
        match self {
            Outcome::Decoded { .. } => OutcomeStatus::Decoded,
            Outcome::Ignored(_) => OutcomeStatus::Ignored,
            Outcome::Failed { .. } => OutcomeStatus::Failed,
        }
    }

    pub fn reading(&self) -> Option<&SensorReading> {
        match self {
            Outcome::Decoded { reading, .. } => Some(reading),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&DecodeError> {
        match self {
            Outcome::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn model(&self) -> Option<DeviceModel> {
        match self {
            Outcome::Decoded { model, .. } | Outcome::Failed { model, .. } => Some(*model),
            Outcome::Ignored(IgnoreReason::NotApplicable { model, .. }) => Some(*model),
            Outcome::Ignored(_) => None,
        }
    }
}

/// Why an envelope was not decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum IgnoreReason {
    /// The event record could not be read into an envelope.
    MalformedEvent { message: String },
    UnrecognizedEvent { name: String },
    NoCodecForPort { port: u8 },
    /// The fallback codec rejected the frame.
    NotApplicable {
        model: DeviceModel,
        error: DecodeError,
    },
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreReason::MalformedEvent { message } => write!(f, "malformed event: {message}"),
            IgnoreReason::UnrecognizedEvent { name } => write!(f, "unrecognized event '{name}'"),
            IgnoreReason::NoCodecForPort { port } => write!(f, "no codec routed for port {port}"),
            IgnoreReason::NotApplicable { model, error } => {
                write!(f, "not a {model} frame: {error}")
            }
        }
    }
}

/// Route every envelope of a batch; the output has one outcome per input, in
/// the same order.
///
/// # Examples
/// ```
/// use ttn_decode_core::{EventEnvelope, OutcomeStatus, RouteTable, route};
///
/// let batch = vec![
///     EventEnvelope::uplink("eui-1", 2, "+GMCqn//AWh6dYY="),
///     EventEnvelope::uplink("eui-1", 2, "invalid"),
/// ];
/// let outcomes = route(&RouteTable::default(), &batch);
/// assert_eq!(outcomes[0].status(), OutcomeStatus::Decoded);
/// assert_eq!(outcomes[1].status(), OutcomeStatus::Failed);
/// ```
pub fn route(routes: &RouteTable, batch: &[EventEnvelope]) -> Vec<Outcome> {
    let outcomes: Vec<Outcome> = batch
        .iter()
        .map(|envelope| route_one(routes, envelope))
        .collect();

    let count = |status: OutcomeStatus| outcomes.iter().filter(|o| o.status() == status).count();
    info!(
        envelopes = outcomes.len(),
        decoded = count(OutcomeStatus::Decoded),
        ignored = count(OutcomeStatus::Ignored),
        failed = count(OutcomeStatus::Failed),
        "batch routed"
    );
    outcomes
}

pub fn route_one(routes: &RouteTable, envelope: &EventEnvelope) -> Outcome {
    let device_id = envelope.device.device_id.as_str();
    let port = envelope.frame.port;

    if let Some(message) = &envelope.schema_error {
        warn!(device_id, event = %envelope.event_name, %message, "skipping malformed event");
        return Outcome::Ignored(IgnoreReason::MalformedEvent {
            message: message.clone(),
        });
    }

    if envelope.event_name != UPLINK_FORWARD_EVENT {
        debug!(device_id, event = %envelope.event_name, "ignoring non-uplink event");
        return Outcome::Ignored(IgnoreReason::UnrecognizedEvent {
            name: envelope.event_name.clone(),
        });
    }

    let Some(selection) = routes.select(port) else {
        debug!(device_id, port, "no codec routed for port");
        return Outcome::Ignored(IgnoreReason::NoCodecForPort { port });
    };

    match selection {
        Selection::Explicit(model) => match model.decode(&envelope.frame.payload) {
            Ok(reading) => {
                debug!(device_id, port, %model, "frame decoded");
                Outcome::Decoded { model, reading }
            }
            Err(error) => {
                warn!(
                    device_id,
                    port,
                    %model,
                    kind = error.kind().as_str(),
                    %error,
                    "frame decode failed"
                );
                Outcome::Failed { model, error }
            }
        },
        Selection::Fallback(model) => match model.decode(&envelope.frame.payload) {
            Ok(reading) => {
                debug!(device_id, port, %model, "frame decoded by fallback codec");
                Outcome::Decoded { model, reading }
            }
            Err(error) => {
                debug!(device_id, port, %model, %error, "fallback codec rejected frame");
                Outcome::Ignored(IgnoreReason::NotApplicable { model, error })
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codecs::{DecodeErrorKind, Lht52Reading};

    const LHT52_FRAME: &str = "+GMCqn//AWh6dYY=";
    const LWL02_FRAME: &str = "TGwCAAALAAAiAA==";

    fn event(name: &str) -> EventEnvelope {
        EventEnvelope {
            event_name: name.to_string(),
            ..EventEnvelope::uplink("eui-1", 2, LHT52_FRAME)
        }
    }

    #[test]
    fn empty_batch_yields_no_outcomes() {
        assert!(route(&RouteTable::default(), &[]).is_empty());
    }

    #[test]
    fn non_uplink_events_are_ignored() {
        let outcome = route_one(&RouteTable::default(), &event("as.up.join.forward"));
        assert_eq!(
            outcome,
            Outcome::Ignored(IgnoreReason::UnrecognizedEvent {
                name: "as.up.join.forward".to_string()
            })
        );
        assert_eq!(outcome.model(), None);
    }

    #[test]
    fn unmapped_port_is_ignored_without_fallback() {
        let outcome = route_one(
            &RouteTable::default(),
            &EventEnvelope::uplink("leak-1", 10, LWL02_FRAME),
        );
        assert_eq!(outcome, Outcome::Ignored(IgnoreReason::NoCodecForPort { port: 10 }));
    }

    #[test]
    fn empty_frame_on_lht52_port_is_reset() {
        let outcome = route_one(&RouteTable::default(), &EventEnvelope::uplink("eui-1", 2, ""));
        assert_eq!(
            outcome.reading(),
            Some(&SensorReading::Lht52(Lht52Reading::Reset))
        );
    }

    #[test]
    fn mapped_port_failure_is_failed() {
        let outcome = route_one(
            &RouteTable::default(),
            &EventEnvelope::uplink("eui-1", 2, LWL02_FRAME),
        );
        assert_eq!(outcome.status(), OutcomeStatus::Failed);
        assert_eq!(outcome.model(), Some(DeviceModel::Lht52));
        assert_eq!(outcome.error().unwrap().kind(), DecodeErrorKind::InvalidLength);
    }

    #[test]
    fn fallback_failure_downgrades_to_not_applicable() {
        let routes = RouteTable::empty().with_fallback(DeviceModel::Lht52);
        let outcome = route_one(&routes, &EventEnvelope::uplink("leak-1", 10, LWL02_FRAME));
        match outcome {
            Outcome::Ignored(IgnoreReason::NotApplicable { model, error }) => {
                assert_eq!(model, DeviceModel::Lht52);
                assert_eq!(error.kind(), DecodeErrorKind::InvalidLength);
            }
            other => panic!("expected not-applicable, got {other:?}"),
        }

        let outcome = route_one(&routes, &EventEnvelope::uplink("eui-1", 7, LHT52_FRAME));
        assert_eq!(outcome.status(), OutcomeStatus::Decoded);
    }

    #[test]
    fn mixed_fleet_routes_by_port() {
        let routes = RouteTable::default().with_route(10, DeviceModel::Lwl02);
        let batch = vec![
            EventEnvelope::uplink("eui-1", 2, LHT52_FRAME),
            EventEnvelope::uplink("leak-1", 10, LWL02_FRAME),
        ];
        let outcomes = route(&routes, &batch);
        assert_eq!(outcomes[0].model(), Some(DeviceModel::Lht52));
        assert_eq!(outcomes[1].model(), Some(DeviceModel::Lwl02));
        assert!(outcomes.iter().all(|o| o.status() == OutcomeStatus::Decoded));
    }

    #[test]
    fn failures_are_isolated_and_order_preserved() {
        let routes = RouteTable::default();
        let mut batch: Vec<EventEnvelope> = (0..5)
            .map(|i| EventEnvelope::uplink(&format!("eui-{i}"), 2, LHT52_FRAME))
            .collect();
        batch[2].frame.payload = "invalid".into();

        let outcomes = route(&routes, &batch);
        assert_eq!(outcomes.len(), batch.len());
        for (i, outcome) in outcomes.iter().enumerate() {
            if i == 2 {
                assert_eq!(outcome.error().unwrap().kind(), DecodeErrorKind::Encoding);
            } else {
                assert_eq!(outcome, &outcomes[0]);
                assert_eq!(outcome.status(), OutcomeStatus::Decoded);
            }
        }
    }

    #[test]
    fn malformed_event_is_ignored_in_place() {
        let mut batch = vec![
            EventEnvelope::uplink("eui-1", 2, LHT52_FRAME),
            EventEnvelope::uplink("eui-2", 2, LHT52_FRAME),
            EventEnvelope::uplink("eui-3", 2, LHT52_FRAME),
        ];
        batch[1].schema_error = Some("invalid type: integer `12345`".to_string());

        let outcomes = route(&RouteTable::default(), &batch);
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].status(), OutcomeStatus::Decoded);
        assert_eq!(
            outcomes[1],
            Outcome::Ignored(IgnoreReason::MalformedEvent {
                message: "invalid type: integer `12345`".to_string()
            })
        );
        assert_eq!(outcomes[1].model(), None);
        assert_eq!(outcomes[2].status(), OutcomeStatus::Decoded);
    }

    #[test]
    fn ignore_reasons_display() {
        assert_eq!(
            IgnoreReason::NoCodecForPort { port: 10 }.to_string(),
            "no codec routed for port 10"
        );
        assert_eq!(
            IgnoreReason::UnrecognizedEvent {
                name: "ns.up.data.receive".to_string()
            }
            .to_string(),
            "unrecognized event 'ns.up.data.receive'"
        );
    }
}
