//! Arithmetic, comparison, and unary operator semantics.
//!
//! Booleans participate in arithmetic as 0 and 1. `/` always produces a
//! float, `//` floors, and `%` takes the sign of the divisor.

use std::cmp::Ordering;

use rewind_foundation::{Error, Result, Value};

use super::MAX_SEQUENCE_LEN;
use crate::operator::{BinaryOp, CompareOp, UnaryOp};

#[derive(Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    const fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Int(n) => Some(Self::Int(*n)),
            Value::Bool(b) => Some(Self::Int(*b as i64)),
            Value::Float(n) => Some(Self::Float(*n)),
            _ => None,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    const fn to_f64(self) -> f64 {
        match self {
            Self::Int(n) => n as f64,
            Self::Float(n) => n,
        }
    }
}

fn unsupported(symbol: &str, left: &Value, right: &Value) -> Error {
    Error::type_error(format!(
        "unsupported operand type(s) for {symbol}: '{}' and '{}'",
        left.type_name(),
        right.type_name()
    ))
}

fn not_arithmetic(op: BinaryOp) -> Error {
    Error::runtime(format!("'{op}' is not an arithmetic operator"))
}

fn overflow() -> Error {
    Error::runtime("integer overflow")
}

/// Applies a binary operator.
///
/// `and`/`or` receive both operands already evaluated and return one of them.
///
/// # Errors
/// Returns a type error for unsupported operand types and a division error
/// for a zero divisor.
pub fn binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
    match op {
        BinaryOp::And => Ok(if left.is_truthy() { right } else { left }.clone()),
        BinaryOp::Or => Ok(if left.is_truthy() { left } else { right }.clone()),
        BinaryOp::Add => add(left, right),
        BinaryOp::Mul => multiply(left, right),
        _ => {
            let symbol = op.to_string();
            let (Some(a), Some(b)) = (Number::of(left), Number::of(right)) else {
                return Err(unsupported(&symbol, left, right));
            };
            arithmetic(op, a, b)
        }
    }
}

fn add(left: &Value, right: &Value) -> Result<Value> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Ok(Value::string(format!("{a}{b}"))),
        (Value::List(a), Value::List(b)) => {
            let mut items = a.to_vec();
            items.extend(b.to_vec());
            Ok(Value::list(items))
        }
        _ => match (Number::of(left), Number::of(right)) {
            (Some(a), Some(b)) => arithmetic(BinaryOp::Add, a, b),
            _ => Err(unsupported("+", left, right)),
        },
    }
}

fn multiply(left: &Value, right: &Value) -> Result<Value> {
    match (left, right) {
        (Value::String(s), count) | (count, Value::String(s)) if count.as_int().is_some() => {
            let times = repetitions(count, s.len(), "str")?;
            Ok(Value::string(s.repeat(times)))
        }
        (Value::List(items), count) | (count, Value::List(items)) if count.as_int().is_some() => {
            let contents = items.to_vec();
            let times = repetitions(count, contents.len(), "list")?;
            Ok(Value::list(
                std::iter::repeat_n(contents, times).flatten(),
            ))
        }
        _ => match (Number::of(left), Number::of(right)) {
            (Some(a), Some(b)) => arithmetic(BinaryOp::Mul, a, b),
            _ => Err(unsupported("*", left, right)),
        },
    }
}

/// Reads a repetition count, rejecting results longer than [`MAX_SEQUENCE_LEN`].
///
/// Negative counts and empty sequences repeat zero times.
fn repetitions(count: &Value, len: usize, type_name: &str) -> Result<usize> {
    if len == 0 {
        return Ok(0);
    }
    let times = usize::try_from(count.as_int().unwrap_or(0)).unwrap_or(0);
    match len.checked_mul(times) {
        Some(total) if total <= MAX_SEQUENCE_LEN => Ok(times),
        _ => Err(Error::runtime(format!("repeated {type_name} is too long"))),
    }
}

fn arithmetic(op: BinaryOp, left: Number, right: Number) -> Result<Value> {
    if let (Number::Int(a), Number::Int(b)) = (left, right) {
        return integer_arithmetic(op, a, b);
    }
    let (a, b) = (left.to_f64(), right.to_f64());
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(Error::zero_division("division by zero"));
            }
            a / b
        }
        BinaryOp::FloorDiv => {
            if b == 0.0 {
                return Err(Error::zero_division("float floor division by zero"));
            }
            (a / b).floor()
        }
        BinaryOp::Mod => {
            if b == 0.0 {
                return Err(Error::zero_division("float modulo"));
            }
            a - b * (a / b).floor()
        }
        BinaryOp::Pow => {
            if a == 0.0 && b < 0.0 {
                return Err(Error::zero_division(
                    "0.0 cannot be raised to a negative power",
                ));
            }
            a.powf(b)
        }
        BinaryOp::And | BinaryOp::Or => return Err(not_arithmetic(op)),
    };
    Ok(Value::Float(result))
}

#[allow(clippy::cast_precision_loss)]
fn integer_arithmetic(op: BinaryOp, a: i64, b: i64) -> Result<Value> {
    let result = match op {
        BinaryOp::Add => a.checked_add(b),
        BinaryOp::Sub => a.checked_sub(b),
        BinaryOp::Mul => a.checked_mul(b),
        BinaryOp::Div => {
            if b == 0 {
                return Err(Error::zero_division("division by zero"));
            }
            return Ok(Value::Float(a as f64 / b as f64));
        }
        BinaryOp::FloorDiv => {
            if b == 0 {
                return Err(Error::zero_division("integer division or modulo by zero"));
            }
            a.checked_div(b).map(|q| {
                // Truncating division; step down when the remainder's sign
                // disagrees with the divisor's.
                if a % b != 0 && (a % b < 0) != (b < 0) { q - 1 } else { q }
            })
        }
        BinaryOp::Mod => {
            if b == 0 {
                return Err(Error::zero_division("integer division or modulo by zero"));
            }
            a.checked_rem(b)
                .map(|r| if r != 0 && (r < 0) != (b < 0) { r + b } else { r })
        }
        BinaryOp::Pow => {
            if b < 0 {
                if a == 0 {
                    return Err(Error::zero_division(
                        "0.0 cannot be raised to a negative power",
                    ));
                }
                return Ok(Value::Float((a as f64).powf(b as f64)));
            }
            u32::try_from(b).ok().and_then(|exp| a.checked_pow(exp))
        }
        BinaryOp::And | BinaryOp::Or => return Err(not_arithmetic(op)),
    };
    result.map(Value::Int).ok_or_else(overflow)
}

/// Orders two values, or returns `None` when they are unordered (NaN).
///
/// # Errors
/// Returns a type error for values of incomparable types.
pub fn ordering(symbol: &str, left: &Value, right: &Value) -> Result<Option<Ordering>> {
    order_values(symbol, left, right, &mut Vec::new())
}

fn order_values(
    symbol: &str,
    left: &Value,
    right: &Value,
    open: &mut Vec<(usize, usize)>,
) -> Result<Option<Ordering>> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Ok(Some(a.cmp(b))),
        (Value::List(a), Value::List(b)) => {
            // A pair already being ordered is settled by the remaining elements.
            let pair = (a.id(), b.id());
            if open.contains(&pair) {
                return Ok(Some(Ordering::Equal));
            }
            open.push(pair);
            let result = order_lists(symbol, &a.to_vec(), &b.to_vec(), open);
            open.pop();
            result
        }
        _ => match (Number::of(left), Number::of(right)) {
            (Some(Number::Int(a)), Some(Number::Int(b))) => Ok(Some(a.cmp(&b))),
            (Some(a), Some(b)) => Ok(a.to_f64().partial_cmp(&b.to_f64())),
            _ => Err(Error::type_error(format!(
                "'{symbol}' not supported between instances of '{}' and '{}'",
                left.type_name(),
                right.type_name()
            ))),
        },
    }
}

fn order_lists(
    symbol: &str,
    a: &[Value],
    b: &[Value],
    open: &mut Vec<(usize, usize)>,
) -> Result<Option<Ordering>> {
    for (x, y) in a.iter().zip(b) {
        if x == y {
            continue;
        }
        match order_values(symbol, x, y, open)? {
            Some(Ordering::Equal) => {}
            other => return Ok(other),
        }
    }
    Ok(Some(a.len().cmp(&b.len())))
}

/// Applies a comparison operator.
///
/// # Errors
/// Returns a type error when ordering incomparable types or testing
/// membership in a non-container.
pub fn compare(op: CompareOp, left: &Value, right: &Value) -> Result<Value> {
    let result = match op {
        CompareOp::Eq => left == right,
        CompareOp::NotEq => left != right,
        CompareOp::In => contains(right, left)?,
        CompareOp::Lt | CompareOp::Gt | CompareOp::LtEq | CompareOp::GtEq => {
            let Some(order) = ordering(&op.to_string(), left, right)? else {
                return Ok(Value::Bool(false));
            };
            match op {
                CompareOp::Lt => order == Ordering::Less,
                CompareOp::Gt => order == Ordering::Greater,
                CompareOp::LtEq => order != Ordering::Greater,
                _ => order != Ordering::Less,
            }
        }
    };
    Ok(Value::Bool(result))
}

/// Membership test: `item in container`.
///
/// # Errors
/// Returns a type error if `container` is not a list or string, or if a
/// non-string is searched for in a string.
pub fn contains(container: &Value, item: &Value) -> Result<bool> {
    match container {
        Value::List(items) => Ok(items.to_vec().iter().any(|x| x == item)),
        Value::String(s) => match item {
            Value::String(needle) => Ok(s.contains(&**needle)),
            other => Err(Error::type_error(format!(
                "'in <string>' requires string as left operand, not {}",
                other.type_name()
            ))),
        },
        other => Err(Error::type_error(format!(
            "argument of type '{}' is not iterable",
            other.type_name()
        ))),
    }
}

/// Applies a unary operator.
///
/// # Errors
/// Returns a type error when negating a non-number.
pub fn unary(op: UnaryOp, operand: &Value) -> Result<Value> {
    match op {
        UnaryOp::Not | UnaryOp::Bang => Ok(Value::Bool(!operand.is_truthy())),
        UnaryOp::Neg => match Number::of(operand) {
            Some(Number::Int(n)) => n.checked_neg().map(Value::Int).ok_or_else(overflow),
            Some(Number::Float(n)) => Ok(Value::Float(-n)),
            None => Err(bad_unary("-", operand)),
        },
        UnaryOp::Pos => match Number::of(operand) {
            Some(Number::Int(n)) => Ok(Value::Int(n)),
            Some(Number::Float(n)) => Ok(Value::Float(n)),
            None => Err(bad_unary("+", operand)),
        },
    }
}

fn bad_unary(symbol: &str, operand: &Value) -> Error {
    Error::type_error(format!(
        "bad operand type for unary {symbol}: '{}'",
        operand.type_name()
    ))
}
