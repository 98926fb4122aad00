//! Rewind - A bidirectionally steppable interpreter for a small Python-like language
//!
//! This crate re-exports all layers of the Rewind system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: rewind_runtime    - Stepper, snapshots, prediction grading, terminal stepper
//! Layer 1: rewind_language   - Lexer, parser, AST compiler, reversible command VM
//! Layer 0: rewind_foundation - Core types (Value, List, Error)
//! ```

pub use rewind_foundation as foundation;
pub use rewind_language as language;
pub use rewind_runtime as runtime;
