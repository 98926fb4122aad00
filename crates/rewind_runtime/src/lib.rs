//! Stepper, snapshots, and terminal front end for Rewind.
//!
//! This crate provides:
//! - [`Stepper`] - Forward and backward stepping over a compiled program
//! - [`Snapshot`] - What a presentation layer shows after each step
//! - [`prediction`] - Grading guesses made in prediction mode
//! - [`Repl`] - The interactive terminal stepper

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod editor;
pub mod error;
pub mod highlight;
pub mod prediction;
pub mod repl;
pub mod snapshot;
pub mod stepper;

pub use config::{DEFAULT_MAX_STEPS, StepperConfig};
pub use editor::{LineEditor, ReadResult, RustylineEditor};
pub use error::{HostError, HostResult};
pub use prediction::PredictionOutcome;
pub use repl::{EditorInput, Repl};
pub use snapshot::{FunctionSnapshot, ScopeSnapshot, Snapshot, SnapshotValue};
pub use stepper::Stepper;
