use std::fs;

use tempfile::TempDir;
use ttn_decode_core::{
    EncodedFrame, IgnoreReason, Outcome, OutcomeStatus, RouteTable, SourceError,
    UPLINK_FORWARD_EVENT, build_report, parse_events, read_events_file, route,
};

#[test]
fn webhook_body_routes_like_live_data() {
    let body = r#"{
        "end_device_ids": {
            "device_id": "eui-a840416c81850cd1",
            "application_ids": {"application_id": "cold-room"}
        },
        "received_at": "2025-07-18T16:25:45.482Z",
        "uplink_message": {"f_port": 2, "frm_payload": "+GMCqn//AWh6dYY="}
    }"#;

    let envelopes = parse_events(body).expect("parse webhook");
    assert_eq!(envelopes.len(), 1);
    assert_eq!(envelopes[0].event_name, UPLINK_FORWARD_EVENT);
    assert_eq!(
        envelopes[0].frame.payload,
        EncodedFrame::new("+GMCqn//AWh6dYY=")
    );

    let outcomes = route(&RouteTable::default(), &envelopes);
    assert_eq!(outcomes[0].status(), OutcomeStatus::Decoded);
}

#[test]
fn empty_export_is_empty_batch() {
    let envelopes = parse_events("[]").expect("parse empty export");
    assert!(envelopes.is_empty());
    assert!(route(&RouteTable::default(), &envelopes).is_empty());
}

#[test]
fn read_events_file_reports_json_errors() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("broken.json");
    fs::write(&path, "[{\"name\": ").expect("write fixture");

    let err = read_events_file(&path).unwrap_err();
    assert!(matches!(err, SourceError::Json(_)));
    assert!(err.to_string().contains("invalid event JSON"));
}

#[test]
fn malformed_payloads_are_decode_failures_not_source_errors() {
    let export = r#"[
        {"name": "as.up.data.forward", "data": {"uplink_message": {"f_port": 2, "frm_payload": "not base64!"}}},
        {"name": "as.up.data.forward", "data": {"uplink_message": {"f_port": 2, "frm_payload": ""}}}
    ]"#;

    let envelopes = parse_events(export).expect("parse export");
    let outcomes = route(&RouteTable::default(), &envelopes);
    assert_eq!(outcomes[0].status(), OutcomeStatus::Failed);
    assert_eq!(outcomes[1].status(), OutcomeStatus::Decoded);
}

#[test]
fn malformed_records_do_not_abort_the_batch() {
    let export = r#"[
        {"name": "as.up.data.forward", "data": {"uplink_message": {"f_port": 2, "frm_payload": "+GMCqn//AWh6dYY="}}},
        {"name": "as.up.data.forward", "data": {"uplink_message": {"f_port": 2, "frm_payload": 12345}}},
        {"name": "as.up.data.forward", "data": {"uplink_message": {"f_port": 300, "frm_payload": "+GMCqn//AWh6dYY="}}},
        {"name": "as.up.data.forward", "data": {"uplink_message": {"f_port": 2, "frm_payload": "+GMCqn//AWh6dYY="}}}
    ]"#;

    let envelopes = parse_events(export).expect("parse export");
    assert_eq!(envelopes.len(), 4);

    let outcomes = route(&RouteTable::default(), &envelopes);
    assert_eq!(outcomes.len(), 4);
    assert_eq!(outcomes[0].status(), OutcomeStatus::Decoded);
    assert_eq!(outcomes[3].status(), OutcomeStatus::Decoded);
    for outcome in &outcomes[1..3] {
        assert!(matches!(
            outcome,
            Outcome::Ignored(IgnoreReason::MalformedEvent { .. })
        ));
    }

    let report = build_report("export.json", export.len() as u64, &envelopes, &outcomes);
    assert_eq!(report.summary.envelopes_total, 4);
    assert_eq!(report.summary.decoded, 2);
    assert_eq!(report.summary.ignored, 2);
    assert!(
        report.outcomes[1]
            .reason
            .as_deref()
            .expect("reason")
            .starts_with("malformed event:")
    );
}

#[test]
fn missing_f_port_is_reported_as_port_zero() {
    let export = r#"[
        {"name": "as.up.data.forward", "data": {"uplink_message": {"frm_payload": "+GMCqn//AWh6dYY="}}}
    ]"#;

    let envelopes = parse_events(export).expect("parse export");
    let outcomes = route(&RouteTable::default(), &envelopes);
    let report = build_report("export.json", 0, &envelopes, &outcomes);

    let record = serde_json::to_value(&report.outcomes[0]).expect("record json");
    assert_eq!(record["port"], 0);
    assert_eq!(record["reason"], "no codec routed for port 0");
}
