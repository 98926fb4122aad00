//! Integration tests for snapshots
//!
//! Tests what snapshots copy and their `MessagePack` encoding.

use std::env;
use std::process;

use rewind_foundation::Value;
use rewind_runtime::snapshot::{from_bytes, load_from_file, save_to_file, to_bytes};
use rewind_runtime::{HostError, SnapshotValue, Stepper, StepperConfig};

fn finished(source: &str) -> Stepper {
    let mut stepper = Stepper::default();
    stepper.load(source).unwrap();
    stepper.to_end();
    stepper
}

#[test]
fn snapshots_do_not_alias_lists() {
    let mut stepper = Stepper::default();
    stepper.load("xs = [1]\nxs.append(2)\n").unwrap();
    stepper.step_forward();
    let before = stepper.snapshot();
    stepper.step_forward();
    assert_eq!(
        before.variables["xs"],
        SnapshotValue::List(vec![SnapshotValue::Int(1)])
    );
    assert_eq!(stepper.snapshot().variables["xs"].to_string(), "[1, 2]");
}

#[test]
fn self_containing_list_is_cut() {
    let list = Value::list([Value::Int(1)]);
    if let Value::List(inner) = &list {
        inner.push(list.clone());
    }
    assert_eq!(SnapshotValue::from_value(&list).to_string(), "[1, [...]]");
}

#[test]
fn step_counters() {
    let stepper = finished("a = 1\nb = 2\n");
    let snapshot = stepper.snapshot();
    assert_eq!(snapshot.current_step, snapshot.total_steps);
    assert_eq!(snapshot.total_steps, stepper.program().len());
    assert!(snapshot.highlighted_statement.is_some());
}

#[test]
fn messagepack_round_trip() {
    let mut stepper = Stepper::new(StepperConfig::quiz());
    stepper
        .load("def f(a):\n    return a\nwords = ['x', 'y']\nn = f(2.5)\nprint(1 / 0)\n")
        .unwrap();
    while stepper.step_forward() {
        if let Some(variable) = stepper.snapshot().prediction_variable {
            stepper.submit_prediction(&variable, "2.5");
        }
    }
    let snapshot = stepper.snapshot();
    assert!(snapshot.error.is_some());
    assert!(snapshot.last_prediction.is_some());

    let bytes = to_bytes(&snapshot).unwrap();
    assert_eq!(from_bytes(&bytes).unwrap(), snapshot);
}

#[test]
fn garbage_does_not_decode() {
    assert!(matches!(from_bytes(&[0xc1, 0x00]), Err(HostError::Decode(_))));
}

#[test]
fn file_round_trip() {
    let path = env::temp_dir().join(format!("rewind-snapshot-{}.msgpack", process::id()));
    let snapshot = finished("print('saved')\n").snapshot();
    save_to_file(&snapshot, &path).unwrap();
    let loaded = load_from_file(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(loaded.outputs, ["saved"]);
    assert_eq!(loaded, snapshot);
}

#[test]
fn missing_file_names_the_path() {
    let err = load_from_file("/nonexistent/rewind/snapshot.msgpack").unwrap_err();
    assert!(err.to_string().contains("/nonexistent/rewind/snapshot.msgpack"));
}
