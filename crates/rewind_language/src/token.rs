//! Token types for the Rewind language.
//!
//! Tokens are the output of the lexer and input to the parser.

use crate::span::Span;

/// A token from lexical analysis.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    /// The type and value of this token.
    pub kind: TokenKind,
    /// Source location of this token.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns the text this token covers in the given source.
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        self.span.text(source)
    }
}

/// The kind of a token, with any literal payload.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    // Literals
    /// Integer literal
    Int(i64),
    /// Float literal
    Float(f64),
    /// String literal (escapes resolved)
    String(String),
    /// Interpolated string literal `f"..."` (escapes resolved, braces kept)
    FString(String),
    /// Identifier
    Identifier(String),

    // Keywords
    /// `if`
    If,
    /// `elif`
    Elif,
    /// `else`
    Else,
    /// `for`
    For,
    /// `in`
    In,
    /// `while`
    While,
    /// `def`
    Def,
    /// `return`
    Return,
    /// `break`
    Break,
    /// `continue`
    Continue,
    /// `pass`
    Pass,
    /// `and`
    And,
    /// `or`
    Or,
    /// `not`
    Not,
    /// `True`
    True,
    /// `False`
    False,
    /// `None`
    None,

    // Delimiters
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `.`
    Dot,

    // Operators
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `**`
    StarStar,
    /// `/`
    Slash,
    /// `//`
    SlashSlash,
    /// `%`
    Percent,
    /// `!`
    Bang,
    /// `=`
    Assign,
    /// `+=`
    PlusAssign,
    /// `-=`
    MinusAssign,
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    LtEq,
    /// `>=`
    GtEq,

    // Layout
    /// End of a logical line
    Newline,
    /// Indentation increased
    Indent,
    /// Indentation decreased
    Dedent,
    /// End of input
    Eof,
    /// Lexer error
    Error(String),
}

impl TokenKind {
    /// Looks up the keyword spelled by `word`, if any.
    #[must_use]
    pub fn keyword(word: &str) -> Option<Self> {
        Some(match word {
            "if" => Self::If,
            "elif" => Self::Elif,
            "else" => Self::Else,
            "for" => Self::For,
            "in" => Self::In,
            "while" => Self::While,
            "def" => Self::Def,
            "return" => Self::Return,
            "break" => Self::Break,
            "continue" => Self::Continue,
            "pass" => Self::Pass,
            "and" => Self::And,
            "or" => Self::Or,
            "not" => Self::Not,
            "True" => Self::True,
            "False" => Self::False,
            "None" => Self::None,
            _ => return None,
        })
    }

    /// Returns true for tokens that only carry layout.
    #[must_use]
    pub const fn is_layout(&self) -> bool {
        matches!(self, Self::Newline | Self::Indent | Self::Dedent | Self::Eof)
    }

    /// Returns a human-readable name for layout tokens.
    #[must_use]
    pub const fn layout_name(&self) -> Option<&'static str> {
        match self {
            Self::Newline => Some("newline"),
            Self::Indent => Some("indent"),
            Self::Dedent => Some("dedent"),
            Self::Eof => Some("end of input"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_text() {
        let source = "42 hello";
        let token = Token::new(TokenKind::Int(42), Span::new(0, 2, 1, 1));
        assert_eq!(token.text(source), "42");
    }

    #[test]
    fn keywords() {
        assert_eq!(TokenKind::keyword("elif"), Some(TokenKind::Elif));
        assert_eq!(TokenKind::keyword("None"), Some(TokenKind::None));
        assert_eq!(TokenKind::keyword("none"), None);
        assert_eq!(TokenKind::keyword("print"), None);
    }

    #[test]
    fn layout_names() {
        assert_eq!(TokenKind::Eof.layout_name(), Some("end of input"));
        assert!(TokenKind::Dedent.is_layout());
        assert!(!TokenKind::Colon.is_layout());
    }
}
