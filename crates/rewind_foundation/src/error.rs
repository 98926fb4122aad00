//! Error types for Rewind.
//!
//! One taxonomy covers both channels: [`ErrorKind::ParseFailure`] is raised
//! before any command runs, every other kind is raised while executing and
//! lands in the execution state's sticky error slot.

use std::fmt;

use thiserror::Error;

/// The main error type for Rewind operations.
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("{kind}{location}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Where the error occurred, if known.
    pub location: Location,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            location: Location { line: None },
        }
    }

    /// Attaches the source line the error was raised on.
    ///
    /// An already attached line is kept.
    #[must_use]
    pub fn with_line(mut self, line: u32) -> Self {
        if self.location.line.is_none() {
            self.location.line = Some(line);
        }
        self
    }

    /// Creates a syntax error at the given position.
    #[must_use]
    pub fn parse(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self::new(ErrorKind::ParseFailure {
            message: message.into(),
            line,
            column,
        })
    }

    /// Creates a generic runtime error.
    #[must_use]
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Runtime(message.into()))
    }

    /// Creates a type error.
    #[must_use]
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Type(message.into()))
    }

    /// Creates a name error for an unbound identifier.
    #[must_use]
    pub fn name_error(name: &str) -> Self {
        Self::new(ErrorKind::Name(format!("name '{name}' is not defined")))
    }

    /// Creates an index error.
    #[must_use]
    pub fn index_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Index(message.into()))
    }

    /// Creates a division-by-zero error.
    #[must_use]
    pub fn zero_division(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ZeroDivision(message.into()))
    }

    /// Returns true if this is a parse failure.
    #[must_use]
    pub const fn is_parse_failure(&self) -> bool {
        matches!(self.kind, ErrorKind::ParseFailure { .. })
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorKind {
    /// Source text could not be parsed or compiled.
    #[error("Syntax Error at line {line}, column {column}: {message}")]
    ParseFailure {
        /// Description of the failure.
        message: String,
        /// Line number (1-indexed).
        line: u32,
        /// Column number (1-indexed).
        column: u32,
    },

    /// Misplaced control flow, exhausted limits, and other generic failures.
    #[error("RuntimeError: {0}")]
    Runtime(String),

    /// Wrong operand or argument types, or wrong argument count.
    #[error("TypeError: {0}")]
    Type(String),

    /// Reference to an unbound identifier.
    #[error("NameError: {0}")]
    Name(String),

    /// Index out of range.
    #[error("IndexError: {0}")]
    Index(String),

    /// Division or modulo by zero.
    #[error("ZeroDivisionError: {0}")]
    ZeroDivision(String),
}

impl ErrorKind {
    /// Returns the language-level class name of this kind.
    #[must_use]
    pub const fn class_name(&self) -> &'static str {
        match self {
            Self::ParseFailure { .. } => "SyntaxError",
            Self::Runtime(_) => "RuntimeError",
            Self::Type(_) => "TypeError",
            Self::Name(_) => "NameError",
            Self::Index(_) => "IndexError",
            Self::ZeroDivision(_) => "ZeroDivisionError",
        }
    }
}

/// Source line attached to a runtime error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    /// Line number (1-indexed).
    pub line: Option<u32>,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, " (line {line})"),
            None => Ok(()),
        }
    }
}

/// Result type alias using Rewind's Error.
pub type Result<T> = std::result::Result<T, Error>;
