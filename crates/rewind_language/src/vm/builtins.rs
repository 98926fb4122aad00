//! Built-in functions.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

use rewind_foundation::{Error, Result, Value};

use super::MAX_SEQUENCE_LEN;
use super::context::InputProvider;
use crate::operator::Builtin;

/// What a built-in produced.
pub(crate) struct Outcome {
    /// The pushed result.
    pub value: Value,
    /// A line appended to the output log.
    pub printed: Option<String>,
}

impl Outcome {
    const fn value(value: Value) -> Self {
        Self {
            value,
            printed: None,
        }
    }
}

/// Calls a built-in with already evaluated arguments.
pub(crate) fn call(
    function: Builtin,
    args: &[Value],
    input: &mut dyn InputProvider,
) -> Result<Outcome> {
    let name = function.name();
    match function {
        Builtin::Print => {
            let line = args
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" ");
            Ok(Outcome {
                value: Value::None,
                printed: Some(line),
            })
        }
        Builtin::Len => {
            let [value] = exactly_one(name, args)?;
            let len = match value {
                Value::String(s) => s.chars().count(),
                Value::List(items) => items.len(),
                other => {
                    return Err(Error::type_error(format!(
                        "object of type '{}' has no len()",
                        other.type_name()
                    )));
                }
            };
            Ok(Outcome::value(Value::Int(to_int(len))))
        }
        Builtin::Type => {
            let [value] = exactly_one(name, args)?;
            Ok(Outcome::value(Value::string(format!(
                "<class '{}'>",
                value.type_name()
            ))))
        }
        Builtin::Input => {
            let prompt = match at_most_one(name, args)? {
                Some(prompt) => prompt.to_string(),
                None => String::new(),
            };
            let line = input.read_line(&prompt)?;
            Ok(Outcome::value(Value::string(line)))
        }
        Builtin::Range => range(args).map(Outcome::value),
        Builtin::Int => {
            let value = match at_most_one(name, args)? {
                None => Value::Int(0),
                Some(value) => to_integer(value)?,
            };
            Ok(Outcome::value(value))
        }
        Builtin::Float => {
            let value = match at_most_one(name, args)? {
                None => Value::Float(0.0),
                Some(value) => to_float(value)?,
            };
            Ok(Outcome::value(value))
        }
        Builtin::Str => {
            let text = at_most_one(name, args)?.map(ToString::to_string);
            Ok(Outcome::value(Value::string(text.unwrap_or_default())))
        }
        Builtin::Bool => {
            let truthy = at_most_one(name, args)?.is_some_and(Value::is_truthy);
            Ok(Outcome::value(Value::Bool(truthy)))
        }
        Builtin::List => {
            let value = match at_most_one(name, args)? {
                None => Value::list([]),
                Some(Value::List(items)) => Value::list(items.to_vec()),
                Some(Value::String(s)) => {
                    Value::list(s.chars().map(|c| Value::string(c.to_string())))
                }
                Some(other) => {
                    return Err(Error::type_error(format!(
                        "'{}' object is not iterable",
                        other.type_name()
                    )));
                }
            };
            Ok(Outcome::value(value))
        }
    }
}

fn to_int(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn exactly_one<'a>(name: &str, args: &'a [Value]) -> Result<[&'a Value; 1]> {
    match args {
        [value] => Ok([value]),
        _ => Err(Error::type_error(format!(
            "{name}() takes exactly one argument ({} given)",
            args.len()
        ))),
    }
}

fn at_most_one<'a>(name: &str, args: &'a [Value]) -> Result<Option<&'a Value>> {
    match args {
        [] => Ok(None),
        [value] => Ok(Some(value)),
        _ => Err(Error::type_error(format!(
            "{name}() takes at most 1 argument ({} given)",
            args.len()
        ))),
    }
}

fn integer_argument(value: &Value) -> Result<i64> {
    value.as_int().ok_or_else(|| {
        Error::type_error(format!(
            "'{}' object cannot be interpreted as an integer",
            value.type_name()
        ))
    })
}

fn range(args: &[Value]) -> Result<Value> {
    let bounds = args
        .iter()
        .map(integer_argument)
        .collect::<Result<Vec<_>>>()?;
    let (start, stop, step) = match bounds[..] {
        [stop] => (0, stop, 1),
        [start, stop] => (start, stop, 1),
        [start, stop, step] => (start, stop, step),
        _ => {
            return Err(Error::type_error(format!(
                "range expected 1 to 3 arguments, got {}",
                args.len()
            )));
        }
    };
    if step == 0 {
        return Err(Error::runtime("range() arg 3 must not be zero"));
    }

    let span = if step > 0 {
        i128::from(stop) - i128::from(start)
    } else {
        i128::from(start) - i128::from(stop)
    };
    let step_size = i128::from(step).abs();
    let len = if span <= 0 {
        0
    } else {
        (span + step_size - 1) / step_size
    };
    let len = usize::try_from(len).unwrap_or(usize::MAX);
    if len > MAX_SEQUENCE_LEN {
        return Err(Error::runtime(format!(
            "range() of {len} elements is too large"
        )));
    }

    let mut current = i128::from(start);
    let mut items = Vec::with_capacity(len);
    for _ in 0..len {
        items.push(Value::Int(current as i64));
        current += i128::from(step);
    }
    Ok(Value::list(items))
}

fn to_integer(value: &Value) -> Result<Value> {
    match value {
        Value::Int(n) => Ok(Value::Int(*n)),
        Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
        Value::Float(n) => {
            if n.is_nan() {
                return Err(Error::runtime("cannot convert float NaN to integer"));
            }
            if n.is_infinite() {
                return Err(Error::runtime("cannot convert float infinity to integer"));
            }
            let truncated = n.trunc();
            if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
                return Err(Error::runtime("integer overflow"));
            }
            Ok(Value::Int(truncated as i64))
        }
        Value::String(s) => {
            let text = s.trim().replace('_', "");
            text.parse::<i64>().map(Value::Int).map_err(|_| {
                Error::runtime(format!("invalid literal for int() with base 10: '{s}'"))
            })
        }
        other => Err(Error::type_error(format!(
            "int() argument must be a string or a number, not '{}'",
            other.type_name()
        ))),
    }
}

fn to_float(value: &Value) -> Result<Value> {
    match value {
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| Error::runtime(format!("could not convert string to float: '{s}'"))),
        other => other.as_number().map(Value::Float).ok_or_else(|| {
            Error::type_error(format!(
                "float() argument must be a string or a number, not '{}'",
                other.type_name()
            ))
        }),
    }
}
