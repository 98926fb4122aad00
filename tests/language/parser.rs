//! Integration tests for the parser
//!
//! Tests statement shapes, precedence, and syntax errors.

use rewind_foundation::ErrorKind;
use rewind_language::ast::{AssignTarget, ExpressionNode, StatementNode};
use rewind_language::{BinaryOp, CompareOp, UnaryOp, parse, parse_expression};

fn statements(source: &str) -> Vec<StatementNode> {
    parse(source).unwrap().body.statements
}

// =============================================================================
// Statements
// =============================================================================

#[test]
fn assignment_targets() {
    let parsed = statements("x = 1\ngrid[0] += 2\n");
    let StatementNode::Assignment(first) = &parsed[0] else {
        panic!("expected assignment");
    };
    assert_eq!(first.target, AssignTarget::Name("x".into()));

    let StatementNode::Assignment(second) = &parsed[1] else {
        panic!("expected assignment");
    };
    let AssignTarget::Index { label, .. } = &second.target else {
        panic!("expected indexed target");
    };
    assert_eq!(label, "grid");
}

#[test]
fn multi_assignment() {
    let parsed = statements("a, b = b, a\n");
    let StatementNode::MultiAssignment(node) = &parsed[0] else {
        panic!("expected multi-assignment");
    };
    assert_eq!(node.targets, ["a", "b"]);
    assert_eq!(node.values.len(), 2);
}

#[test]
fn elif_chains_nest() {
    let parsed = statements("if a:\n    x = 1\nelif b:\n    x = 2\nelse:\n    x = 3\n");
    assert_eq!(parsed.len(), 1);
    let StatementNode::If(node) = &parsed[0] else {
        panic!("expected if");
    };
    let Some(else_branch) = &node.else_branch else {
        panic!("expected elif");
    };
    let StatementNode::Elif(elif) = else_branch.as_ref() else {
        panic!("expected elif link");
    };
    assert!(elif.else_branch.is_some());
}

#[test]
fn loops_and_functions() {
    let parsed = statements(
        "def f(a, b):\n    while a < b:\n        a += 1\n    return a\nfor i in range(3):\n    pass\n",
    );
    let StatementNode::FunctionDefinition(def) = &parsed[0] else {
        panic!("expected def");
    };
    assert_eq!(def.name, "f");
    assert_eq!(def.params.names, ["a", "b"]);
    assert_eq!(def.body.statements.len(), 2);

    let StatementNode::For(node) = &parsed[1] else {
        panic!("expected for");
    };
    assert_eq!(node.variable, "i");
}

#[test]
fn statement_spans_cover_their_lines() {
    let parsed = statements("if x:\n    y = 1\n    z = 2\n");
    let span = parsed[0].span();
    assert_eq!(span.line, 1);
    assert_eq!(span.end_line, 3);
}

// =============================================================================
// Expressions
// =============================================================================

#[test]
fn arithmetic_precedence() {
    let ExpressionNode::Binary { op, right, .. } = parse_expression("1 + 2 * 3").unwrap() else {
        panic!("expected binary");
    };
    assert_eq!(op, BinaryOp::Add);
    assert!(matches!(*right, ExpressionNode::Binary { op: BinaryOp::Mul, .. }));
}

#[test]
fn power_binds_tighter_than_unary_minus() {
    let expression = parse_expression("-2 ** 2").unwrap();
    assert!(matches!(expression, ExpressionNode::Unary { .. }));
}

#[test]
fn not_in_negates_membership() {
    let ExpressionNode::Unary { op, operand, .. } = parse_expression("x not in xs").unwrap() else {
        panic!("expected negation");
    };
    assert_eq!(op, UnaryOp::Not);
    assert!(matches!(*operand, ExpressionNode::Comparison { op: CompareOp::In, .. }));
}

#[test]
fn comparison_chains_become_conjunctions() {
    let ExpressionNode::Binary { op, .. } = parse_expression("0 < x < 10").unwrap() else {
        panic!("expected conjunction");
    };
    assert_eq!(op, BinaryOp::And);
}

#[test]
fn postfix_chains() {
    let expression = parse_expression("rows[1][2:].count(3)").unwrap();
    let ExpressionNode::MethodCall { method, receiver, .. } = expression else {
        panic!("expected method call");
    };
    assert_eq!(method, "count");
    assert!(matches!(*receiver, ExpressionNode::Slice { .. }));
}

#[test]
fn ternary() {
    let expression = parse_expression("a if a > b else b").unwrap();
    assert!(matches!(expression, ExpressionNode::Ternary { .. }));
}

// =============================================================================
// Syntax Errors
// =============================================================================

#[test]
fn unexpected_token_reports_position() {
    let err = parse("x = 1\ny = = 2\n").unwrap_err();
    let ErrorKind::ParseFailure { line, column, message } = &err.kind else {
        panic!("expected parse failure");
    };
    assert_eq!(*line, 2);
    assert_eq!(*column, 5);
    assert_eq!(message, "Unexpected token \"=\"");
}

#[test]
fn malformed_programs_fail() {
    for source in [
        "if x\n    y = 1\n",
        "for in xs:\n    pass\n",
        "def f(a, a):\n    pass\n",
        "print(1\n",
        "x = 'open\n",
        "1 = x\n",
    ] {
        let result = parse(source);
        assert!(
            result.as_ref().is_err_and(rewind_foundation::Error::is_parse_failure),
            "{source:?} should not parse"
        );
    }
}
