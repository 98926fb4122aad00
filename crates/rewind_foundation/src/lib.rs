//! Core values and errors for Rewind.
//!
//! This crate provides:
//! - [`Value`] - The dynamically typed value of the interpreted language
//! - [`List`] - The shared, mutable list handle behind `Value::List`
//! - [`Error`] - The error taxonomy shared by compilation and execution

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod collections;
mod error;
mod value;

pub use collections::List;
pub use error::{Error, ErrorKind, Location, Result};
pub use value::{Value, format_float};
