//! Source location tracking.
//!
//! `Span` tracks the position of tokens and AST nodes in source code for
//! error reporting. [`StatementSpan`] and [`ExpressionSpan`] are the reduced
//! forms that highlight commands carry for the presentation layer.

/// A span of source text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Span {
    /// Byte offset where this span starts.
    pub start: usize,
    /// Byte offset where this span ends (exclusive).
    pub end: usize,
    /// 1-based line number where this span starts.
    pub line: u32,
    /// 1-based column number where this span starts.
    pub column: u32,
    /// 1-based line number where this span ends.
    pub end_line: u32,
    /// 1-based column just past the last character.
    pub end_column: u32,
}

impl Span {
    /// Creates a single-line span.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
            end_line: line,
            end_column: column + (end - start) as u32,
        }
    }

    /// Creates a span with an explicit end position.
    #[must_use]
    pub const fn between(start: (usize, u32, u32), end: (usize, u32, u32)) -> Self {
        Self {
            start: start.0,
            end: end.0,
            line: start.1,
            column: start.2,
            end_line: end.1,
            end_column: end.2,
        }
    }

    /// Creates a span at the start of input.
    #[must_use]
    pub const fn at_start() -> Self {
        Self::new(0, 0, 1, 1)
    }

    /// Creates a span covering the range from this span to another.
    #[must_use]
    pub const fn to(self, other: Self) -> Self {
        Self {
            start: self.start,
            end: other.end,
            line: self.line,
            column: self.column,
            end_line: other.end_line,
            end_column: other.end_column,
        }
    }

    /// Returns the length of this span in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if this span is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Extracts the text covered by this span from the source.
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start..self.end).unwrap_or("")
    }

    /// Reduces this span to the lines a statement highlight covers.
    #[must_use]
    pub const fn statement(&self) -> StatementSpan {
        StatementSpan {
            start_line: self.line,
            end_line: self.end_line,
        }
    }

    /// Reduces this span to an expression highlight.
    ///
    /// Multi-line expressions are clipped to their first line.
    #[must_use]
    pub const fn expression(&self) -> ExpressionSpan {
        let end_column = if self.end_line == self.line && self.end_column > self.column {
            self.end_column - 1
        } else {
            self.column
        };
        ExpressionSpan {
            line: self.line,
            start_column: self.column,
            end_column,
        }
    }
}

/// Inclusive line range of the statement being executed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatementSpan {
    /// First line (1-based).
    pub start_line: u32,
    /// Last line (1-based, inclusive).
    pub end_line: u32,
}

/// Position of the expression being evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExpressionSpan {
    /// Line (1-based).
    pub line: u32,
    /// First column (1-based).
    pub start_column: u32,
    /// Last column (1-based, inclusive).
    pub end_column: u32,
}
