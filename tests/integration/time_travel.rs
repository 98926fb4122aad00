//! Time travel integration tests
//!
//! Tests stepping back across calls, loops, errors, and prediction pauses.

use rewind_foundation::{ErrorKind, Value};
use rewind_runtime::{SnapshotValue, Stepper, StepperConfig};

fn loaded(source: &str) -> Stepper {
    let mut stepper = Stepper::default();
    stepper.load(source).unwrap();
    stepper
}

/// Steps forward until `done` holds after a step.
fn forward_until(stepper: &mut Stepper, done: impl Fn(&Stepper) -> bool) {
    while !done(&*stepper) {
        assert!(stepper.step_forward(), "program ended before the condition held");
    }
}

// =============================================================================
// Calls
// =============================================================================

#[test]
fn back_across_return_reenters_the_callee() {
    let mut stepper = loaded("def inc(n):\n    n += 1\n    return n\nr = inc(1)\nprint(r)\n");
    forward_until(&mut stepper, |s| s.state().lookup("r").is_some());
    assert_eq!(stepper.state().scopes().len(), 1);

    assert!(stepper.step_back());
    assert!(stepper.state().lookup("r").is_none());
    while stepper.state().scopes().len() == 1 {
        assert!(stepper.step_back());
    }
    assert_eq!(stepper.state().active_scope().name, "inc");
    assert_eq!(stepper.state().lookup("n"), Some(Value::Int(2)));
}

#[test]
fn back_across_recursion_unwinds_frames() {
    let source = "def down(n):\n    if n == 0:\n        return 0\n    return down(n - 1)\nprint(down(3))\n";
    let mut stepper = loaded(source);
    let mut deepest = 0;
    while stepper.step_forward() {
        deepest = deepest.max(stepper.state().calls().len());
    }
    assert_eq!(deepest, 4);
    assert_eq!(stepper.state().outputs(), ["0"]);

    stepper.to_beginning();
    assert!(stepper.state().calls().is_empty());
    assert!(stepper.state().functions().is_empty());
    assert!(stepper.state().outputs().is_empty());
}

// =============================================================================
// Loops
// =============================================================================

#[test]
fn back_across_break_restores_the_loop() {
    let mut stepper = loaded("for c in 'abc':\n    if c == 'b':\n        break\nprint('done')\n");
    forward_until(&mut stepper, |s| !s.state().outputs().is_empty());
    assert!(stepper.state().loop_cursors().is_empty());
    assert!(stepper.state().loops().is_empty());

    while stepper.state().loops().is_empty() {
        assert!(stepper.step_back());
    }
    assert_eq!(stepper.state().loop_cursors().get("c"), Some(&2));
    assert_eq!(stepper.state().lookup("c"), Some(Value::string("b")));
}

#[test]
fn loop_iterations_track_the_cursor() {
    let mut stepper = loaded("for n in [10, 20, 30]:\n    pass\n");
    let mut seen = Vec::new();
    while stepper.step_forward() {
        if let Some(cursor) = stepper.snapshot().loop_iterations.get("n") {
            seen.push(*cursor);
        }
    }
    seen.dedup();
    assert_eq!(seen, [1, 2, 3]);
    assert!(stepper.snapshot().loop_iterations.is_empty());
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn error_is_undone_by_one_step_back() {
    let mut stepper = loaded("xs = [1]\nprint(xs[0])\nprint(xs[5])\n");
    stepper.to_end();
    assert!(matches!(
        stepper.state().error().map(|e| &e.kind),
        Some(ErrorKind::Index(_))
    ));
    assert_eq!(stepper.state().outputs(), ["1"]);

    assert!(stepper.step_back());
    assert!(stepper.state().error().is_none());
    assert_eq!(stepper.state().outputs(), ["1"]);

    assert!(!stepper.step_forward());
    assert!(stepper.state().error().is_some());
}

// =============================================================================
// Prediction
// =============================================================================

#[test]
fn pause_returns_after_stepping_back() {
    let mut stepper = Stepper::new(StepperConfig::quiz());
    stepper.load("x = 3\ny = x * 2\n").unwrap();

    stepper.step_forward();
    assert!(stepper.submit_prediction("x", "3"));
    stepper.step_forward();
    assert_eq!(stepper.snapshot().prediction_variable.as_deref(), Some("y"));
    assert!(stepper.submit_prediction("y", "6"));
    assert!(!stepper.step_forward());

    assert!(stepper.step_back());
    assert!(stepper.state().lookup("y").is_none());
    assert!(!stepper.is_waiting());

    assert!(stepper.step_forward());
    assert!(stepper.is_waiting());
    assert_eq!(
        stepper.snapshot().prediction_correct_value,
        Some(SnapshotValue::Int(6))
    );
}

#[test]
fn toggling_prediction_midway() {
    let mut stepper = loaded("a = 1\nb = 2\nc = 3\n");
    stepper.step_forward();
    stepper.set_prediction_mode(true);
    stepper.step_forward();
    assert_eq!(stepper.snapshot().prediction_variable.as_deref(), Some("b"));
    stepper.set_prediction_mode(false);
    assert!(!stepper.is_waiting());
    assert_eq!(stepper.state().lookup("b"), Some(Value::Int(2)));
    stepper.to_end();
    assert_eq!(stepper.state().lookup("c"), Some(Value::Int(3)));
    assert!(stepper.snapshot().last_prediction.is_none());
}

// =============================================================================
// Whole timeline
// =============================================================================

#[test]
fn end_to_start_to_end() {
    let source = "\
words = ['b', 'a']
words.sort()
out = ''
for w in words:
    out += w
print(out)
";
    let mut stepper = loaded(source);
    let steps = stepper.to_end();
    let end = stepper.state().deep_copy();
    assert_eq!(stepper.state().outputs(), ["ab"]);

    stepper.to_beginning();
    assert_eq!(stepper.current_step(), 0);
    assert_eq!(stepper.to_end(), steps);
    assert_eq!(*stepper.state(), end);
}
