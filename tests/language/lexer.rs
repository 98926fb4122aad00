//! Integration tests for the lexer
//!
//! Tests layout tokens and literal forms over whole programs.

use rewind_language::{Lexer, TokenKind};

fn kinds(source: &str) -> Vec<TokenKind> {
    Lexer::tokenize_all(source)
        .into_iter()
        .map(|token| token.kind)
        .collect()
}

#[test]
fn nested_blocks_balance_indents() {
    let source = "\
for i in xs:
    if i:
        print(i)
print(0)
";
    let tokens = kinds(source);
    let indents = tokens.iter().filter(|k| **k == TokenKind::Indent).count();
    let dedents = tokens.iter().filter(|k| **k == TokenKind::Dedent).count();
    assert_eq!(indents, 2);
    assert_eq!(dedents, 2);
    assert_eq!(tokens.last(), Some(&TokenKind::Eof));
}

#[test]
fn comments_and_blank_lines_produce_nothing() {
    let source = "# header\n\nx = 1  # trailing\n\n   # indented comment\n";
    assert_eq!(
        kinds(source),
        vec![
            TokenKind::Identifier("x".into()),
            TokenKind::Assign,
            TokenKind::Int(1),
            TokenKind::Newline,
            TokenKind::Eof
        ]
    );
}

#[test]
fn operators() {
    assert_eq!(
        kinds("a ** b // c != d"),
        vec![
            TokenKind::Identifier("a".into()),
            TokenKind::StarStar,
            TokenKind::Identifier("b".into()),
            TokenKind::SlashSlash,
            TokenKind::Identifier("c".into()),
            TokenKind::NotEq,
            TokenKind::Identifier("d".into()),
            TokenKind::Newline,
            TokenKind::Eof
        ]
    );
}

#[test]
fn keywords_are_case_sensitive() {
    let tokens = kinds("True true None none");
    assert_eq!(tokens[0], TokenKind::True);
    assert_eq!(tokens[1], TokenKind::Identifier("true".into()));
    assert_eq!(tokens[2], TokenKind::None);
    assert_eq!(tokens[3], TokenKind::Identifier("none".into()));
}

#[test]
fn spans_point_at_source_text() {
    let source = "total = f\"{x}\"";
    let tokens = Lexer::tokenize_all(source);
    assert_eq!(tokens[0].text(source), "total");
    assert_eq!(tokens[2].kind, TokenKind::FString("{x}".into()));
    assert_eq!(tokens[2].span.column, 9);
}
