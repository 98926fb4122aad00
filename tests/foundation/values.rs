//! Integration tests for Value types
//!
//! Tests truthiness, equality across numeric types, display, and copying.

use rewind_foundation::{Value, format_float};

// =============================================================================
// Truthiness
// =============================================================================

#[test]
fn falsy_values() {
    for value in [
        Value::None,
        Value::Bool(false),
        Value::Int(0),
        Value::Float(0.0),
        Value::string(""),
        Value::list([]),
    ] {
        assert!(!value.is_truthy(), "{} should be falsy", value.repr());
    }
}

#[test]
fn truthy_values() {
    for value in [
        Value::Bool(true),
        Value::Int(-1),
        Value::Float(0.1),
        Value::string("0"),
        Value::list([Value::None]),
    ] {
        assert!(value.is_truthy(), "{} should be truthy", value.repr());
    }
}

// =============================================================================
// Equality
// =============================================================================

#[test]
fn numbers_compare_across_types() {
    assert_eq!(Value::Int(1), Value::Float(1.0));
    assert_eq!(Value::Bool(true), Value::Int(1));
    assert_ne!(Value::Int(1), Value::string("1"));
    assert_ne!(Value::None, Value::Bool(false));
}

#[test]
fn lists_compare_by_contents() {
    let a = Value::list([Value::Int(1), Value::string("x")]);
    let b = Value::list([Value::Int(1), Value::string("x")]);
    assert_eq!(a, b);
    assert_ne!(a, Value::list([Value::Int(1)]));
}

// =============================================================================
// Display
// =============================================================================

#[test]
fn display_follows_print() {
    assert_eq!(Value::None.to_string(), "None");
    assert_eq!(Value::Bool(true).to_string(), "True");
    assert_eq!(Value::Float(3.0).to_string(), "3.0");
    assert_eq!(Value::string("hi").to_string(), "hi");
    assert_eq!(
        Value::list([Value::string("hi"), Value::Float(0.5), Value::None]).to_string(),
        "['hi', 0.5, None]"
    );
}

#[test]
fn repr_quotes_strings() {
    assert_eq!(Value::string("a").repr(), "'a'");
    assert_eq!(Value::string("it's").repr(), "\"it's\"");
    assert_eq!(Value::string("line\n").repr(), "'line\\n'");
}

#[test]
fn float_formatting() {
    assert_eq!(format_float(2.5), "2.5");
    assert_eq!(format_float(-0.0), "-0.0");
    assert_eq!(format_float(1e16), "1e+16");
    assert_eq!(format_float(0.00001), "1e-05");
    assert_eq!(format_float(f64::INFINITY), "inf");
}

#[test]
fn type_names() {
    assert_eq!(Value::None.type_name(), "NoneType");
    assert_eq!(Value::Int(1).type_name(), "int");
    assert_eq!(Value::string("").type_name(), "str");
    assert_eq!(Value::list([]).type_name(), "list");
}

// =============================================================================
// Copying
// =============================================================================

#[test]
fn clone_aliases_deep_copy_does_not() {
    let original = Value::list([Value::Int(1)]);
    let alias = original.clone();
    let copy = original.deep_copy();

    original.as_list().unwrap().push(Value::Int(2));

    assert_eq!(alias.to_string(), "[1, 2]");
    assert_eq!(copy.to_string(), "[1]");
}

#[test]
fn deep_copy_preserves_shared_structure() {
    let inner = Value::list([Value::Int(0)]);
    let outer = Value::list([inner.clone(), inner]);
    let copy = outer.deep_copy();

    let items = copy.as_list().unwrap().to_vec();
    items[0].as_list().unwrap().push(Value::Int(9));
    assert_eq!(copy.to_string(), "[[0, 9], [0, 9]]");
    assert_eq!(outer.to_string(), "[[0], [0]]");
}
