//! Integration tests for Error types
//!
//! Tests construction, kinds, and the rendered messages.

use rewind_foundation::{Error, ErrorKind};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn kinds_by_constructor() {
    assert!(matches!(Error::runtime("x").kind, ErrorKind::Runtime(_)));
    assert!(matches!(Error::type_error("x").kind, ErrorKind::Type(_)));
    assert!(matches!(Error::name_error("x").kind, ErrorKind::Name(_)));
    assert!(matches!(Error::index_error("x").kind, ErrorKind::Index(_)));
    assert!(matches!(Error::zero_division("x").kind, ErrorKind::ZeroDivision(_)));
    assert!(Error::parse("x", 1, 1).is_parse_failure());
    assert!(!Error::runtime("x").is_parse_failure());
}

#[test]
fn class_names() {
    assert_eq!(Error::zero_division("x").kind.class_name(), "ZeroDivisionError");
    assert_eq!(Error::parse("x", 1, 1).kind.class_name(), "SyntaxError");
    assert_eq!(Error::name_error("x").kind.class_name(), "NameError");
}

// =============================================================================
// Display
// =============================================================================

#[test]
fn runtime_errors_render_with_line() {
    let err = Error::zero_division("division by zero").with_line(4);
    assert_eq!(err.to_string(), "ZeroDivisionError: division by zero (line 4)");
}

#[test]
fn first_line_wins() {
    let err = Error::index_error("list index out of range").with_line(2).with_line(9);
    assert_eq!(err.location.line, Some(2));
}

#[test]
fn name_errors_quote_the_name() {
    let err = Error::name_error("total");
    assert_eq!(err.to_string(), "NameError: name 'total' is not defined");
}

#[test]
fn parse_failures_report_position() {
    let err = Error::parse("Unexpected token \"=\"", 3, 7);
    assert_eq!(
        err.to_string(),
        "Syntax Error at line 3, column 7: Unexpected token \"=\""
    );
}
