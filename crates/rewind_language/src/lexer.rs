//! Lexer for the Rewind language.
//!
//! The lexer converts source text into a stream of tokens. Indentation is
//! significant: the lexer tracks a stack of indentation widths and emits
//! `Indent`/`Dedent` tokens at the start of logical lines, and a `Newline`
//! at the end of each one. Newlines inside brackets are ignored.

use std::collections::VecDeque;

use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Lexer for Rewind source code.
pub struct Lexer<'src> {
    /// Source text being tokenized.
    source: &'src str,
    /// Remaining source text.
    rest: &'src str,
    /// Current byte offset in source.
    position: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    column: u32,
    /// Indentation widths of the open blocks; the bottom entry is 0.
    indents: Vec<u32>,
    /// Open bracket depth.
    depth: usize,
    /// True when the next token starts a physical line.
    at_line_start: bool,
    /// Layout tokens waiting to be handed out.
    pending: VecDeque<Token>,
    /// True when nothing has been emitted since the last logical line ended.
    line_closed: bool,
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            rest: source,
            position: 0,
            line: 1,
            column: 1,
            indents: vec![0],
            depth: 0,
            at_line_start: true,
            pending: VecDeque::new(),
            line_closed: true,
        }
    }

    /// Returns the next token from the source.
    pub fn next_token(&mut self) -> Token {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return self.emit(token);
            }
            if self.at_line_start && self.depth == 0 {
                self.at_line_start = false;
                self.scan_indentation();
                continue;
            }
            self.skip_inline_whitespace();
            if self.peek_char() == Some('\n') {
                let span = Span::new(self.position, self.position + 1, self.line, self.column);
                self.advance();
                if self.depth > 0 {
                    continue;
                }
                self.at_line_start = true;
                if self.line_closed {
                    continue;
                }
                return self.emit(Token::new(TokenKind::Newline, span));
            }
            break;
        }

        let start = self.mark();
        let Some(c) = self.peek_char() else {
            return self.end_of_input();
        };

        let kind = match c {
            '(' | '[' => {
                self.advance();
                self.depth += 1;
                if c == '(' {
                    TokenKind::LParen
                } else {
                    TokenKind::LBracket
                }
            }
            ')' | ']' => {
                self.advance();
                self.depth = self.depth.saturating_sub(1);
                if c == ')' {
                    TokenKind::RParen
                } else {
                    TokenKind::RBracket
                }
            }
            ',' => self.single(TokenKind::Comma),
            ':' => self.single(TokenKind::Colon),
            '.' if self.peek_char_n(1).is_some_and(|c| c.is_ascii_digit()) => self.scan_number(),
            '.' => self.single(TokenKind::Dot),
            '%' => self.single(TokenKind::Percent),
            '+' => self.either('=', TokenKind::PlusAssign, TokenKind::Plus),
            '-' => self.either('=', TokenKind::MinusAssign, TokenKind::Minus),
            '*' => self.either('*', TokenKind::StarStar, TokenKind::Star),
            '/' => self.either('/', TokenKind::SlashSlash, TokenKind::Slash),
            '!' => self.either('=', TokenKind::NotEq, TokenKind::Bang),
            '=' => self.either('=', TokenKind::EqEq, TokenKind::Assign),
            '<' => self.either('=', TokenKind::LtEq, TokenKind::Lt),
            '>' => self.either('=', TokenKind::GtEq, TokenKind::Gt),
            '"' | '\'' => match self.scan_string(c) {
                Ok(text) => TokenKind::String(text),
                Err(message) => TokenKind::Error(message),
            },
            'f' | 'F' if matches!(self.peek_char_n(1), Some('"' | '\'')) => {
                self.advance();
                let quote = self.peek_char().unwrap_or('"');
                match self.scan_string(quote) {
                    Ok(text) => TokenKind::FString(text),
                    Err(message) => TokenKind::Error(message),
                }
            }
            c if c.is_ascii_digit() => self.scan_number(),
            c if is_identifier_start(c) => self.scan_identifier(),
            c => {
                self.advance();
                TokenKind::Error(format!("Unexpected character '{c}'"))
            }
        };

        let token = Token::new(kind, Span::between(start, self.mark()));
        self.emit(token)
    }

    /// Tokenizes all source and returns a vector of tokens ending in `Eof`.
    #[must_use]
    pub fn tokenize_all(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn emit(&mut self, token: Token) -> Token {
        self.line_closed = matches!(
            token.kind,
            TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent
        );
        token
    }

    /// Closes the last logical line and any open blocks, then yields `Eof`.
    fn end_of_input(&mut self) -> Token {
        let here = Span::new(self.position, self.position, self.line, self.column);
        if !self.line_closed {
            return self.emit(Token::new(TokenKind::Newline, here));
        }
        if self.indents.len() > 1 {
            self.indents.pop();
            return self.emit(Token::new(TokenKind::Dedent, here));
        }
        Token::new(TokenKind::Eof, here)
    }

    /// Measures the indentation of the next non-blank line and queues the
    /// resulting `Indent`/`Dedent` tokens.
    fn scan_indentation(&mut self) {
        loop {
            let start = self.mark();
            let mut width = 0;
            while let Some(c) = self.peek_char() {
                match c {
                    ' ' => width += 1,
                    '\t' => width = (width / 8 + 1) * 8,
                    '\r' | '\x0c' => {}
                    _ => break,
                }
                self.advance();
            }
            match self.peek_char() {
                None => return,
                Some('\n') => {
                    self.advance();
                    continue;
                }
                Some('#') => {
                    self.skip_comment();
                    continue;
                }
                Some(_) => {}
            }

            let span = Span::between(start, self.mark());
            let current = self.indents.last().copied().unwrap_or(0);
            if width > current {
                self.indents.push(width);
                self.pending.push_back(Token::new(TokenKind::Indent, span));
            } else if width < current {
                while self.indents.last().is_some_and(|&w| w > width) {
                    self.indents.pop();
                    self.pending.push_back(Token::new(TokenKind::Dedent, span));
                }
                if self.indents.last().copied().unwrap_or(0) != width {
                    self.pending.push_back(Token::new(
                        TokenKind::Error(
                            "unindent does not match any outer indentation level".into(),
                        ),
                        span,
                    ));
                }
            }
            return;
        }
    }

    fn mark(&self) -> (usize, u32, u32) {
        (self.position, self.line, self.column)
    }

    /// Peeks at the next character without consuming it.
    fn peek_char(&self) -> Option<char> {
        self.rest.chars().next()
    }

    /// Peeks `n` characters ahead.
    fn peek_char_n(&self, n: usize) -> Option<char> {
        self.rest.chars().nth(n)
    }

    /// Advances past the next character.
    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            let len = c.len_utf8();
            self.rest = &self.rest[len..];
            self.position += len;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    /// Consumes one character, plus `next` if it follows.
    fn either(&mut self, next: char, joined: TokenKind, alone: TokenKind) -> TokenKind {
        self.advance();
        if self.peek_char() == Some(next) {
            self.advance();
            joined
        } else {
            alone
        }
    }

    /// Skips spaces, comments, and backslash line continuations.
    fn skip_inline_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            match c {
                ' ' | '\t' | '\r' | '\x0c' => self.advance(),
                '#' => self.skip_comment(),
                '\\' if self.peek_char_n(1) == Some('\n') => {
                    self.advance();
                    self.advance();
                }
                _ => break,
            }
        }
    }

    /// Skips to the end of the line, leaving the newline in place.
    fn skip_comment(&mut self) {
        while let Some(c) = self.peek_char() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Scans a quoted string, resolving escapes.
    fn scan_string(&mut self, quote: char) -> Result<String, String> {
        self.advance(); // consume opening quote
        let mut text = String::new();
        loop {
            match self.peek_char() {
                Some(c) if c == quote => {
                    self.advance();
                    return Ok(text);
                }
                Some('\\') => {
                    self.advance();
                    let Some(escaped) = self.peek_char() else {
                        return Err("unterminated string literal".into());
                    };
                    self.advance();
                    match escaped {
                        'n' => text.push('\n'),
                        't' => text.push('\t'),
                        'r' => text.push('\r'),
                        '0' => text.push('\0'),
                        '\n' => {}
                        '\\' | '\'' | '"' => text.push(escaped),
                        other => {
                            text.push('\\');
                            text.push(other);
                        }
                    }
                }
                Some('\n') | None => return Err("unterminated string literal".into()),
                Some(c) => {
                    self.advance();
                    text.push(c);
                }
            }
        }
    }

    /// Scans an integer or float literal.
    fn scan_number(&mut self) -> TokenKind {
        let start = self.position;

        if self.peek_char() == Some('0') {
            let radix = match self.peek_char_n(1) {
                Some('x' | 'X') => Some(16),
                Some('b' | 'B') => Some(2),
                Some('o' | 'O') => Some(8),
                _ => None,
            };
            if let Some(radix) = radix {
                self.advance();
                self.advance();
                let digits_start = self.position;
                while self
                    .peek_char()
                    .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
                {
                    self.advance();
                }
                let digits: String = self.source[digits_start..self.position]
                    .chars()
                    .filter(|&c| c != '_')
                    .collect();
                return match i64::from_str_radix(&digits, radix) {
                    Ok(n) => TokenKind::Int(n),
                    Err(_) => TokenKind::Error(format!(
                        "invalid number literal '{}'",
                        &self.source[start..self.position]
                    )),
                };
            }
        }

        let mut is_float = false;
        self.skip_digits();
        if self.peek_char() == Some('.')
            && !self.peek_char_n(1).is_some_and(is_identifier_start)
        {
            is_float = true;
            self.advance();
            self.skip_digits();
        }
        if matches!(self.peek_char(), Some('e' | 'E')) {
            let signed = matches!(self.peek_char_n(1), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek_char_n(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                self.advance();
                if signed {
                    self.advance();
                }
                self.skip_digits();
            }
        }

        let text: String = self.source[start..self.position]
            .chars()
            .filter(|&c| c != '_')
            .collect();
        if is_float {
            match text.parse::<f64>() {
                Ok(n) => TokenKind::Float(n),
                Err(e) => TokenKind::Error(format!("invalid float: {e}")),
            }
        } else {
            match text.parse::<i64>() {
                Ok(n) => TokenKind::Int(n),
                Err(e) => TokenKind::Error(format!("invalid integer: {e}")),
            }
        }
    }

    fn skip_digits(&mut self) {
        while self
            .peek_char()
            .is_some_and(|c| c.is_ascii_digit() || c == '_')
        {
            self.advance();
        }
    }

    /// Scans an identifier or keyword.
    fn scan_identifier(&mut self) -> TokenKind {
        let start = self.position;
        while self.peek_char().is_some_and(is_identifier_char) {
            self.advance();
        }
        let word = &self.source[start..self.position];
        TokenKind::keyword(word).unwrap_or_else(|| TokenKind::Identifier(word.to_string()))
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
