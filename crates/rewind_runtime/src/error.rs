//! Errors raised by the host side of Rewind.
//!
//! Program failures stay in [`rewind_foundation::Error`]; this type adds the
//! ways the terminal, the filesystem, and snapshot encoding can fail.

use std::path::PathBuf;

use thiserror::Error;

/// A failure outside the interpreted program.
#[derive(Debug, Error)]
pub enum HostError {
    /// The program failed to compile or raised an error.
    #[error(transparent)]
    Program(#[from] rewind_foundation::Error),

    /// The line editor failed.
    #[error("line editor: {0}")]
    Editor(String),

    /// A file could not be read or written.
    #[error("{action} '{}': {source}", path.display())]
    Io {
        /// What was being attempted, e.g. `failed to read`.
        action: &'static str,
        /// The file involved.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// A snapshot could not be encoded.
    #[error("snapshot encoding failed: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// A snapshot could not be decoded.
    #[error("snapshot decoding failed: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    /// A command-line argument was invalid.
    #[error("{0}")]
    Usage(String),
}

impl HostError {
    /// Wraps an I/O failure on `path`.
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

/// Result type for host operations.
pub type HostResult<T> = std::result::Result<T, HostError>;
