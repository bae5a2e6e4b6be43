use time::format_description::well_known::Rfc3339;

use crate::dispatch::{IgnoreReason, Outcome, OutcomeStatus};
use crate::source::EventEnvelope;
use crate::{BatchReport, BatchSummary, ErrorRecord, OutcomeRecord, make_stub_report};

/// Pair each envelope with its outcome and count statuses.
///
/// `envelopes` and `outcomes` must come from the same [`route`](crate::route)
/// call, so both slices have the same length.
pub fn build_report(
    input_path: &str,
    input_bytes: u64,
    envelopes: &[EventEnvelope],
    outcomes: &[Outcome],
) -> BatchReport {
    debug_assert_eq!(envelopes.len(), outcomes.len(), "one outcome per envelope");
    let mut report = make_stub_report(input_path, input_bytes);
    report.outcomes = envelopes
        .iter()
        .zip(outcomes)
        .enumerate()
        .map(|(index, (envelope, outcome))| outcome_record(index, envelope, outcome))
        .collect();
    report.summary = summarize(&report.outcomes);
    report
}

fn summarize(records: &[OutcomeRecord]) -> BatchSummary {
    let mut summary = BatchSummary {
        envelopes_total: records.len() as u64,
        ..BatchSummary::default()
    };
    for record in records {
        match record.status {
            OutcomeStatus::Decoded => summary.decoded += 1,
            OutcomeStatus::Ignored => summary.ignored += 1,
            OutcomeStatus::Failed => summary.failed += 1,
        }
    }
    summary
}

fn outcome_record(index: usize, envelope: &EventEnvelope, outcome: &Outcome) -> OutcomeRecord {
    let device_id = Some(envelope.device.device_id.clone()).filter(|id| !id.is_empty());
    let received_at = envelope
        .frame
        .received_at
        .and_then(|ts| ts.format(&Rfc3339).ok());

    let mut record = OutcomeRecord {
        index,
        device_id,
        dev_eui: envelope.device.dev_eui.clone(),
        application_id: envelope.device.application_id.clone(),
        port: envelope.frame.port,
        received_at,
        status: outcome.status(),
        model: outcome.model(),
        reading: None,
        reason: None,
        error: None,
    };

    match outcome {
        Outcome::Decoded { reading, .. } => record.reading = Some(reading.clone()),
        Outcome::Ignored(reason) => {
            record.reason = Some(reason.to_string());
            if let IgnoreReason::NotApplicable { error, .. } = reason {
                record.error = Some(ErrorRecord::from(error));
            }
        }
        Outcome::Failed { error, .. } => record.error = Some(ErrorRecord::from(error)),
    }
    record
}
