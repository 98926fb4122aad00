//! Integration tests for the stepper
//!
//! Tests stepping scenarios end to end through the public API.

use rewind_foundation::{ErrorKind, Value};
use rewind_runtime::{SnapshotValue, Stepper, StepperConfig};

fn loaded(source: &str) -> Stepper {
    let mut stepper = Stepper::default();
    stepper.load(source).unwrap();
    stepper
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn assignment_then_print() {
    let mut stepper = loaded("x = 1\nprint(x)\n");
    stepper.to_end();
    let snapshot = stepper.snapshot();
    assert_eq!(snapshot.outputs, ["1"]);
    assert_eq!(snapshot.variables.len(), 1);
    assert_eq!(snapshot.variables["x"], SnapshotValue::Int(1));
    assert!(!snapshot.can_step_forward);
    assert!(snapshot.can_step_backward);
}

#[test]
fn for_loop_prints_each_element() {
    let mut stepper = loaded("for i in [1, 2, 3]:\n    print(i)\n");
    let mut saw_cursor = false;
    while stepper.step_forward() {
        saw_cursor |= stepper.snapshot().loop_iterations.contains_key("i");
    }
    assert!(saw_cursor);
    let snapshot = stepper.snapshot();
    assert_eq!(snapshot.outputs, ["1", "2", "3"]);
    assert!(!snapshot.loop_iterations.contains_key("i"));
}

#[test]
fn division_by_zero_is_sticky() {
    let mut stepper = loaded("x = 1 / 0\n");
    assert!(!stepper.step_forward());
    let snapshot = stepper.snapshot();
    let error = snapshot.error.unwrap();
    assert!(matches!(error.kind, ErrorKind::ZeroDivision(_)));
    assert!(!snapshot.can_step_forward);
    assert!(snapshot.can_step_backward);
}

#[test]
fn prediction_pauses_on_assignment() {
    let mut stepper = Stepper::new(StepperConfig::quiz());
    stepper.load("x = 5\n").unwrap();
    assert!(stepper.step_forward());

    let snapshot = stepper.snapshot();
    assert!(snapshot.waiting_for_prediction);
    assert_eq!(snapshot.prediction_variable.as_deref(), Some("x"));
    assert_eq!(snapshot.prediction_correct_value, Some(SnapshotValue::Int(5)));

    assert!(stepper.submit_prediction("x", "anything"));
    let snapshot = stepper.snapshot();
    assert!(!snapshot.waiting_for_prediction);
    assert!(snapshot.prediction_variable.is_none());
    assert_eq!(snapshot.variables["x"], SnapshotValue::Int(5));
    assert_eq!(snapshot.last_prediction.map(|p| p.correct), Some(false));
}

#[test]
fn negative_index() {
    let mut stepper = loaded("lst = [1, 2, 3]\nprint(lst[-1])\n");
    stepper.to_end();
    assert_eq!(stepper.state().outputs(), ["3"]);
}

#[test]
fn unbound_name() {
    let mut stepper = loaded("print(y)\n");
    stepper.to_end();
    let snapshot = stepper.snapshot();
    assert!(matches!(snapshot.error.map(|e| e.kind), Some(ErrorKind::Name(_))));
    assert!(snapshot.outputs.is_empty());
}

// =============================================================================
// Stepping
// =============================================================================

#[test]
fn each_step_ends_on_a_visible_command() {
    let mut stepper = loaded("a = 1\nb = a + 1\nprint(a, b)\n");
    assert!(stepper.step_forward());
    assert_eq!(stepper.snapshot().variables.len(), 1);
    assert!(stepper.step_forward());
    assert_eq!(stepper.snapshot().variables["b"], SnapshotValue::Int(2));
    assert!(stepper.step_forward());
    assert_eq!(stepper.state().outputs(), ["1 2"]);
    assert!(!stepper.step_forward());
}

#[test]
fn back_then_forward_replays_identically() {
    let mut stepper = loaded("xs = []\nfor i in range(3):\n    xs.append(i * i)\nprint(xs)\n");
    let mut states = vec![stepper.state().deep_copy()];
    while stepper.step_forward() {
        states.push(stepper.state().deep_copy());
    }
    assert_eq!(stepper.state().outputs(), ["[0, 1, 4]"]);

    for expected in states.iter().rev().skip(1) {
        assert!(stepper.step_back());
        assert_eq!(stepper.state(), expected);
    }
    assert!(!stepper.step_back());

    for expected in states.iter().skip(1) {
        assert!(stepper.step_forward());
        assert_eq!(stepper.state(), expected);
    }
}

#[test]
fn stepping_through_a_call_shows_local_scope() {
    let mut stepper = loaded("def double(n):\n    m = n * 2\n    return m\nr = double(4)\n");
    let mut deepest = 0;
    while stepper.step_forward() {
        let snapshot = stepper.snapshot();
        deepest = deepest.max(snapshot.scopes.len());
        if snapshot.scopes.len() == 2 && snapshot.variables.contains_key("m") {
            assert_eq!(snapshot.scopes[1].name, "double");
            assert_eq!(snapshot.variables["n"], SnapshotValue::Int(4));
        }
    }
    assert_eq!(deepest, 2);
    let snapshot = stepper.snapshot();
    assert_eq!(snapshot.variables["r"], SnapshotValue::Int(8));
    assert_eq!(snapshot.functions.len(), 1);
    assert_eq!(snapshot.functions[0].params, ["n"]);
}

#[test]
fn reloading_resets_everything() {
    let mut stepper = loaded("x = 1\n");
    stepper.to_end();
    stepper.load("y = 2\n").unwrap();
    assert_eq!(stepper.current_step(), 0);
    assert!(!stepper.can_step_backward());
    assert!(stepper.state().lookup("x").is_none());
}

#[test]
fn parse_error_is_reported_in_snapshot() {
    let mut stepper = Stepper::default();
    assert!(stepper.load("for x in\n").is_err());
    let snapshot = stepper.snapshot();
    assert!(snapshot.parse_error.unwrap().starts_with("Syntax Error at line 1"));
    assert!(!snapshot.can_step_forward);
    assert!(!snapshot.can_step_backward);
}

#[test]
fn prediction_for_list_elements() {
    let mut stepper = Stepper::new(StepperConfig::quiz());
    stepper.load("nums = [1, 2]\nnums[1] = 7\n").unwrap();
    stepper.step_forward();
    assert!(stepper.submit_prediction("nums", "[1, 2]"));
    assert_eq!(stepper.last_prediction().map(|p| p.correct), Some(true));

    stepper.step_forward();
    assert_eq!(stepper.snapshot().prediction_variable.as_deref(), Some("nums[1]"));
    assert!(stepper.submit_prediction("nums[1]", "7"));
    assert_eq!(stepper.last_prediction().map(|p| p.correct), Some(true));
    assert_eq!(
        stepper.state().lookup("nums"),
        Some(Value::list([Value::Int(1), Value::Int(7)]))
    );
}
