//! Integration tests for Layer 2: Runtime
//!
//! Tests for the stepper, prediction grading, and snapshots.

mod prediction;
mod snapshot;
mod stepper;
