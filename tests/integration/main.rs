//! Cross-layer integration tests for Rewind
//!
//! Tests that compile real programs and step them in both directions.

mod round_trip;
mod time_travel;
