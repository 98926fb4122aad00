//! Integration tests for prediction grading
//!
//! Tests how guesses compare with assigned values.

use rewind_foundation::Value;
use rewind_runtime::prediction::{grade, parse_guess};
use rewind_runtime::{Stepper, StepperConfig};

#[test]
fn numbers_compare_by_value() {
    assert!(grade("x", "3", &Value::Int(3)).correct);
    assert!(grade("x", "3.0", &Value::Int(3)).correct);
    assert!(grade("x", "0.5", &Value::Float(0.5)).correct);
    assert!(!grade("x", "4", &Value::Int(3)).correct);
}

#[test]
fn strings_match_quoted_or_bare() {
    let value = Value::string("hello");
    assert!(grade("s", "'hello'", &value).correct);
    assert!(grade("s", "\"hello\"", &value).correct);
    assert!(grade("s", "hello", &value).correct);
    assert!(!grade("s", "'Hello'", &value).correct);
}

#[test]
fn digit_strings_match_when_typed_bare() {
    let value = Value::string("42");
    assert!(grade("s", "42", &value).correct);
    assert!(grade("s", "'42'", &value).correct);
}

#[test]
fn lists_match_with_or_without_brackets() {
    let value = Value::list([Value::Int(1), Value::string("a")]);
    assert!(grade("xs", "[1, 'a']", &value).correct);
    assert!(grade("xs", "1, 'a'", &value).correct);
    assert!(!grade("xs", "[1]", &value).correct);
}

#[test]
fn outcome_records_both_sides() {
    let outcome = grade("total", " 7 ", &Value::string("7!"));
    assert_eq!(outcome.variable, "total");
    assert_eq!(outcome.guess, "7");
    assert_eq!(outcome.expected, "'7!'");
    assert!(!outcome.correct);
}

#[test]
fn booleans_and_none() {
    assert_eq!(parse_guess("False"), Value::Bool(false));
    assert!(grade("flag", "True", &Value::Bool(true)).correct);
    assert!(grade("r", "None", &Value::None).correct);
    assert!(!grade("r", "none", &Value::None).correct);
}

#[test]
fn quiz_over_a_loop() {
    let mut stepper = Stepper::new(StepperConfig::quiz());
    stepper.load("total = 0\nfor i in range(3):\n    total += i\n").unwrap();
    let answers = [
        ("total", "0"),
        ("i", "0"),
        ("total", "0"),
        ("i", "1"),
        ("total", "1"),
        ("i", "2"),
        ("total", "2"),
    ];
    let mut graded = Vec::new();
    for (expected, guess) in answers {
        assert!(stepper.step_forward());
        let variable = stepper.snapshot().prediction_variable.unwrap();
        assert_eq!(variable, expected);
        assert!(stepper.submit_prediction(&variable, guess));
        graded.push(stepper.last_prediction().is_some_and(|p| p.correct));
    }
    assert_eq!(graded, [true, true, true, true, true, true, false]);
    assert_eq!(stepper.state().lookup("total"), Some(Value::Int(3)));
}
