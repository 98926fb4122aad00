//! Interpolated string templates.
//!
//! An f-string literal is split once, at parse time, into literal text and
//! `{...}` segments. A segment holding a bare identifier becomes a direct
//! lookup; anything else is kept as source text and evaluated by compiling
//! it with the same expression compiler as top-level code.

use crate::token::TokenKind;

/// A parsed interpolated string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    /// The segments, in order.
    pub parts: Vec<TemplatePart>,
}

/// One segment of a [`Template`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TemplatePart {
    /// Literal text, with `{{`/`}}` already unescaped.
    Literal(String),
    /// A bare identifier between braces.
    Name(String),
    /// Any other expression between braces, as source text.
    Expression(String),
}

impl Template {
    /// Splits the body of an f-string into segments.
    ///
    /// # Errors
    /// Returns a description of the problem if the braces are unbalanced or
    /// a segment is empty.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut chars = raw.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => return Err("f-string: single '}' is not allowed".into()),
                '{' => {
                    let mut inner = String::new();
                    let mut depth = 0usize;
                    let mut closed = false;
                    for c in chars.by_ref() {
                        match c {
                            '}' if depth == 0 => {
                                closed = true;
                                break;
                            }
                            '(' | '[' | '{' => depth += 1,
                            ')' | ']' | '}' => depth = depth.saturating_sub(1),
                            _ => {}
                        }
                        inner.push(c);
                    }
                    if !closed {
                        return Err("f-string: expecting '}'".into());
                    }
                    let inner = inner.trim();
                    if inner.is_empty() {
                        return Err("f-string: empty expression not allowed".into());
                    }
                    if !literal.is_empty() {
                        parts.push(TemplatePart::Literal(std::mem::take(&mut literal)));
                    }
                    parts.push(if is_plain_name(inner) {
                        TemplatePart::Name(inner.to_string())
                    } else {
                        TemplatePart::Expression(inner.to_string())
                    });
                }
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            parts.push(TemplatePart::Literal(literal));
        }
        Ok(Self { parts })
    }

    /// Iterates over the source text of the expression segments.
    pub fn expressions(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|part| match part {
            TemplatePart::Expression(text) => Some(text.as_str()),
            _ => None,
        })
    }
}

fn is_plain_name(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next().is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
        && TokenKind::keyword(text).is_none()
}
