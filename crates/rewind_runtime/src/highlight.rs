//! Syntax highlighting for the terminal stepper.
//!
//! Colors come from the language's own lexer, so the editor and the
//! interpreter always agree on what a token is.

use std::borrow::Cow;

use rewind_language::{Lexer, TokenKind};

const RESET: &str = "\x1b[0m";

/// Highlighter for Rewind source lines.
#[derive(Clone, Copy, Debug, Default)]
pub struct SourceHighlighter;

impl SourceHighlighter {
    /// Creates a new highlighter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Highlights one line of input.
    #[allow(clippy::unused_self)]
    #[must_use]
    pub fn highlight<'l>(&self, line: &'l str) -> Cow<'l, str> {
        if line.starts_with(':') || line.trim().is_empty() {
            return Cow::Borrowed(line);
        }

        let mut result = String::with_capacity(line.len() * 2);
        let mut written = 0;
        for token in Lexer::tokenize_all(line) {
            let span = token.span;
            if span.start < written || span.end > line.len() || span.is_empty() {
                continue;
            }
            push_gap(&mut result, &line[written..span.start]);
            let text = &line[span.start..span.end];
            match color(&token.kind) {
                Some(code) => {
                    result.push_str(code);
                    result.push_str(text);
                    result.push_str(RESET);
                }
                None => result.push_str(text),
            }
            written = span.end;
        }
        push_gap(&mut result, &line[written..]);
        Cow::Owned(result)
    }
}

/// Copies text between tokens, dimming a trailing comment.
fn push_gap(result: &mut String, gap: &str) {
    match gap.find('#') {
        Some(hash) => {
            result.push_str(&gap[..hash]);
            result.push_str("\x1b[2;3m");
            result.push_str(&gap[hash..]);
            result.push_str(RESET);
        }
        None => result.push_str(gap),
    }
}

fn color(kind: &TokenKind) -> Option<&'static str> {
    Some(match kind {
        TokenKind::If
        | TokenKind::Elif
        | TokenKind::Else
        | TokenKind::For
        | TokenKind::In
        | TokenKind::While
        | TokenKind::Def
        | TokenKind::Return
        | TokenKind::Break
        | TokenKind::Continue
        | TokenKind::Pass => "\x1b[32m",
        TokenKind::And | TokenKind::Or | TokenKind::Not => "\x1b[36m",
        TokenKind::True | TokenKind::False | TokenKind::None => "\x1b[34m",
        TokenKind::Int(_) | TokenKind::Float(_) => "\x1b[35m",
        TokenKind::String(_) | TokenKind::FString(_) => "\x1b[33m",
        TokenKind::LParen | TokenKind::RParen | TokenKind::LBracket | TokenKind::RBracket => {
            "\x1b[1m"
        }
        TokenKind::Error(_) => "\x1b[31m",
        _ => return None,
    })
}
