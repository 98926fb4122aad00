//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Value, List, and Error.

mod collections;
mod errors;
mod values;
