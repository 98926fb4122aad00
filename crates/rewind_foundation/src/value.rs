//! Core value type of the interpreted language.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::collections::List;

/// A dynamically typed value.
///
/// Scalars are immutable; `List` is a shared handle, so cloning a list value
/// aliases it exactly the way assignment does in the interpreted language.
#[derive(Clone)]
pub enum Value {
    /// The `None` value.
    None,
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// Immutable string.
    String(Arc<str>),
    /// Shared mutable list.
    List(List),
}

impl Value {
    /// Creates a string value.
    #[must_use]
    pub fn string(s: impl AsRef<str>) -> Self {
        Self::String(Arc::from(s.as_ref()))
    }

    /// Creates a fresh list value from the given elements.
    #[must_use]
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Self::List(items.into_iter().collect())
    }

    /// Returns the language-level type name (`int`, `str`, ...).
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::None => "NoneType",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "str",
            Self::List(_) => "list",
        }
    }

    /// Returns true if this value is `None`.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Returns true if this value is truthy.
    ///
    /// `None`, `False`, zero, and empty strings and lists are falsy.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::None => false,
            Self::Bool(b) => *b,
            Self::Int(n) => *n != 0,
            Self::Float(n) => *n != 0.0,
            Self::String(s) => !s.is_empty(),
            Self::List(items) => !items.is_empty(),
        }
    }

    /// Attempts to extract an integer, treating booleans as 0/1.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Bool(b) => Some(*b as i64),
            _ => None,
        }
    }

    /// Attempts to extract a number as f64 (ints and booleans convert).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(n) => Some(*n),
            Self::Bool(b) => Some(f64::from(u8::from(*b))),
            _ => None,
        }
    }

    /// Returns true for ints, floats, and booleans.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_) | Self::Bool(_))
    }

    /// Attempts to extract a string reference.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to extract a list handle.
    #[must_use]
    pub const fn as_list(&self) -> Option<&List> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Renders the value the way it appears inside a list literal.
    ///
    /// Strings are quoted; everything else matches [`Display`](fmt::Display).
    #[must_use]
    pub fn repr(&self) -> String {
        let mut out = String::new();
        write_repr(self, &mut out, &mut Vec::new());
        out
    }

    /// Copies the value, recursively duplicating lists.
    ///
    /// Aliasing inside the value is preserved: a list reachable twice is
    /// copied once, and self-referencing lists stay self-referencing.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        deep_copy(self, &mut HashMap::new())
    }
}

fn deep_copy(value: &Value, copies: &mut HashMap<usize, List>) -> Value {
    match value {
        Value::List(list) => {
            if let Some(copy) = copies.get(&list.id()) {
                return Value::List(copy.clone());
            }
            let copy = List::new();
            copies.insert(list.id(), copy.clone());
            for item in list.to_vec() {
                copy.push(deep_copy(&item, copies));
            }
            Value::List(copy)
        }
        other => other.clone(),
    }
}

fn write_repr(value: &Value, out: &mut String, open: &mut Vec<usize>) {
    match value {
        Value::String(s) => out.push_str(&quote(s)),
        Value::List(list) => {
            if open.contains(&list.id()) {
                out.push_str("[...]");
                return;
            }
            open.push(list.id());
            out.push('[');
            for (i, item) in list.to_vec().iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_repr(item, out, open);
            }
            out.push(']');
            open.pop();
        }
        other => out.push_str(&other.to_string()),
    }
}

fn quote(s: &str) -> String {
    let delimiter = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(delimiter);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c if c == delimiter => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(delimiter);
    out
}

/// Formats a float the way the interpreted language prints it.
///
/// Integral values keep a trailing `.0`; very large or very small magnitudes
/// switch to exponent notation (`1e+16`, `1.5e-05`).
#[must_use]
pub fn format_float(n: f64) -> String {
    if n.is_nan() {
        return "nan".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let magnitude = n.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let formatted = format!("{n:e}");
        let Some((mantissa, exponent)) = formatted.split_once('e') else {
            return formatted;
        };
        let exponent: i32 = exponent.parse().unwrap_or_default();
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{mantissa}e{sign}{:02}", exponent.abs());
    }
    if n.fract() == 0.0 {
        format!("{n:.1}")
    } else {
        format!("{n}")
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        equal(self, other, &mut Vec::new())
    }
}

fn equal(left: &Value, right: &Value, open: &mut Vec<(usize, usize)>) -> bool {
    match (left, right) {
        (Value::None, Value::None) => true,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::List(a), Value::List(b)) => lists_equal(a, b, open),
        (Value::Float(a), Value::Float(b)) => a == b || a.to_bits() == b.to_bits(),
        (Value::Float(a), b) | (b, Value::Float(a)) => b.as_number().is_some_and(|b| *a == b),
        (a, b) => match (a.as_int(), b.as_int()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
    }
}

/// Compares lists element by element.
///
/// `open` holds the pairs of lists currently being compared; meeting a pair
/// again means both sides recurse the same way, so it counts as equal.
pub(crate) fn lists_equal(a: &List, b: &List, open: &mut Vec<(usize, usize)>) -> bool {
    if a.ptr_eq(b) {
        return true;
    }
    let pair = (a.id(), b.id());
    if open.contains(&pair) {
        return true;
    }
    let (left, right) = (a.contents(), b.contents());
    if left.len() != right.len() {
        return false;
    }
    open.push(pair);
    let result = left.iter().zip(right.iter()).all(|(x, y)| equal(x, y, open));
    open.pop();
    result
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.repr())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Bool(true) => write!(f, "True"),
            Self::Bool(false) => write!(f, "False"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{}", format_float(*n)),
            Self::String(s) => write!(f, "{s}"),
            Self::List(_) => write!(f, "{}", self.repr()),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeSeq;

        match self {
            Self::None => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(n) => serializer.serialize_i64(*n),
            Self::Float(n) => serializer.serialize_f64(*n),
            Self::String(s) => serializer.serialize_str(s),
            Self::List(list) => {
                let items = list.to_vec();
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in &items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

// Convenience From implementations

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(Arc::from(s))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(List::from(items))
    }
}
