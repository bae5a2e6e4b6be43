use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use ttn_decode_core::{
    DeviceModel, LeakStatus, OutcomeStatus, RouteTable, SensorReading, decode_events_file,
};

fn repo_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..")
}

fn load_expected_report(dir: &str) -> Value {
    let expected_path = repo_root().join(dir).join("expected_report.json");
    let expected_json = fs::read_to_string(&expected_path).expect("read expected_report.json");
    serde_json::from_str(&expected_json).expect("parse expected report")
}

fn run_golden(dir: &str) {
    let input = repo_root().join(dir).join("input.json");
    let expected = load_expected_report(dir);

    let actual = decode_events_file(&input, &RouteTable::default()).expect("decode events");
    // Round-trip through text so floats are compared after identical parsing.
    let actual_json = serde_json::to_string(&actual).expect("serialize actual");
    let mut actual_value: Value = serde_json::from_str(&actual_json).expect("parse actual");
    actual_value["input"] = expected["input"].clone();
    actual_value["tool"]["version"] = expected["tool"]["version"].clone();

    assert_eq!(actual_value, expected, "golden mismatch in {dir}");
}

#[test]
fn golden_mixed_fleet() {
    run_golden("tests/golden/mixed_fleet");
}

#[test]
fn golden_mixed_fleet_with_leak_route() {
    let input = repo_root().join("tests/golden/mixed_fleet/input.json");
    let routes = RouteTable::default().with_route(10, DeviceModel::Lwl02);
    let report = decode_events_file(&input, &routes).expect("decode events");

    assert_eq!(report.summary.decoded, 3);
    assert_eq!(report.summary.ignored, 1);
    assert_eq!(report.summary.failed, 2);

    let leak = &report.outcomes[3];
    assert_eq!(leak.status, OutcomeStatus::Decoded);
    assert_eq!(leak.model, Some(DeviceModel::Lwl02));
    match leak.reading.as_ref().expect("reading") {
        SensorReading::Lwl02(reading) => {
            assert_eq!(reading.battery_voltage, 3.18);
            assert_eq!(reading.leak_status, LeakStatus::Unknown);
        }
        other => panic!("expected lwl02 reading, got {other:?}"),
    }
}

#[test]
fn golden_mixed_fleet_with_fallback_skips_foreign_frames() {
    let input = repo_root().join("tests/golden/mixed_fleet/input.json");
    let routes = RouteTable::empty().with_fallback(DeviceModel::Lht52);
    let report = decode_events_file(&input, &routes).expect("decode events");

    assert_eq!(report.summary.envelopes_total, 6);
    assert_eq!(report.summary.decoded, 2);
    assert_eq!(report.summary.failed, 0);
    assert_eq!(report.summary.ignored, 4);
    for index in [2, 3, 4] {
        let record = &report.outcomes[index];
        assert_eq!(record.status, OutcomeStatus::Ignored);
        assert!(record.error.is_some());
    }
}

#[test]
fn missing_input_is_io_error() {
    let input = repo_root().join("tests/golden/does_not_exist/input.json");
    let err = decode_events_file(&input, &RouteTable::default()).unwrap_err();
    assert!(err.to_string().contains("I/O error"), "{err}");
}
