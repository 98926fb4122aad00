//! List and string methods, indexing, and slicing.
//!
//! Every operation validates its arguments before touching the receiver,
//! so a failed call leaves the list exactly as it was.

use std::cmp::Ordering;

use im::Vector;
use rewind_foundation::{Error, List, Result, Value};

use super::operators::ordering;
use crate::operator::Method;

/// What a method call produced.
pub(crate) struct MethodOutcome {
    /// The pushed result.
    pub value: Value,
    /// The mutated list and its contents before the call.
    pub previous: Option<(List, Vector<Value>)>,
}

impl MethodOutcome {
    const fn value(value: Value) -> Self {
        Self {
            value,
            previous: None,
        }
    }
}

/// Maps a possibly negative index onto `0..len`.
pub(crate) fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let index = if index < 0 { index + len } else { index };
    if (0..len).contains(&index) {
        usize::try_from(index).ok()
    } else {
        None
    }
}

fn arity(method: Method, args: &[Value], expected: usize) -> Result<()> {
    if args.len() == expected {
        return Ok(());
    }
    let name = method.name();
    Err(Error::type_error(match expected {
        0 => format!("{name}() takes no arguments ({} given)", args.len()),
        _ => format!("{name}() takes exactly one argument ({} given)", args.len()),
    }))
}

fn no_attribute(receiver: &Value, method: Method) -> Error {
    Error::type_error(format!(
        "'{}' object has no attribute '{}'",
        receiver.type_name(),
        method.name()
    ))
}

fn to_int(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Calls `method` on `receiver`.
pub(crate) fn call(method: Method, receiver: &Value, args: &[Value]) -> Result<MethodOutcome> {
    match receiver {
        Value::List(list) => list_method(method, list, args),
        Value::String(s) => string_method(method, receiver, s, args),
        other => Err(no_attribute(other, method)),
    }
}

fn list_method(method: Method, list: &List, args: &[Value]) -> Result<MethodOutcome> {
    let mutated = |value: Value, contents: Vector<Value>| MethodOutcome {
        value,
        previous: Some((list.clone(), contents)),
    };
    match method {
        Method::Append => {
            arity(method, args, 1)?;
            let contents = list.contents();
            list.push(args[0].clone());
            Ok(mutated(Value::None, contents))
        }
        Method::Count => {
            arity(method, args, 1)?;
            let count = list.to_vec().iter().filter(|x| **x == args[0]).count();
            Ok(MethodOutcome::value(Value::Int(to_int(count))))
        }
        Method::Pop => {
            if args.len() > 1 {
                return Err(Error::type_error(format!(
                    "pop expected at most 1 argument, got {}",
                    args.len()
                )));
            }
            if list.is_empty() {
                return Err(Error::index_error("pop from empty list"));
            }
            let position = match args.first() {
                None => list.len() - 1,
                Some(index) => {
                    let index = index.as_int().ok_or_else(|| {
                        Error::type_error(format!(
                            "'{}' object cannot be interpreted as an integer",
                            index.type_name()
                        ))
                    })?;
                    normalize_index(index, list.len())
                        .ok_or_else(|| Error::index_error("pop index out of range"))?
                }
            };
            let contents = list.contents();
            let item = list.remove(position).unwrap_or(Value::None);
            Ok(mutated(item, contents))
        }
        Method::Sort => {
            arity(method, args, 0)?;
            let mut items = list.to_vec();
            let mut failure = None;
            items.sort_by(|a, b| match ordering("<", a, b) {
                Ok(order) => order.unwrap_or(Ordering::Equal),
                Err(err) => {
                    failure.get_or_insert(err);
                    Ordering::Equal
                }
            });
            if let Some(err) = failure {
                return Err(err);
            }
            let contents = list.contents();
            list.replace(items.into_iter().collect());
            Ok(mutated(Value::None, contents))
        }
        Method::Remove => {
            arity(method, args, 1)?;
            let position = list
                .to_vec()
                .iter()
                .position(|x| *x == args[0])
                .ok_or_else(|| Error::runtime("list.remove(x): x not in list"))?;
            let contents = list.contents();
            list.remove(position);
            Ok(mutated(Value::None, contents))
        }
        Method::Index => {
            arity(method, args, 1)?;
            let position = list.to_vec().iter().position(|x| *x == args[0]);
            Ok(MethodOutcome::value(Value::Int(
                position.map_or(-1, to_int),
            )))
        }
        Method::Reverse => {
            arity(method, args, 0)?;
            let contents = list.contents();
            let reversed: Vector<Value> = contents.iter().rev().cloned().collect();
            list.replace(reversed);
            Ok(mutated(Value::None, contents))
        }
        Method::Contains => {
            arity(method, args, 1)?;
            let found = list.to_vec().iter().any(|x| *x == args[0]);
            Ok(MethodOutcome::value(Value::Bool(found)))
        }
    }
}

fn string_method(method: Method, receiver: &Value, s: &str, args: &[Value]) -> Result<MethodOutcome> {
    if !matches!(method, Method::Count | Method::Index | Method::Contains) {
        return Err(no_attribute(receiver, method));
    }
    arity(method, args, 1)?;
    let Some(needle) = args[0].as_str() else {
        return Err(Error::type_error(format!(
            "must be str, not {}",
            args[0].type_name()
        )));
    };
    let value = match method {
        Method::Count => {
            let count = if needle.is_empty() {
                s.chars().count() + 1
            } else {
                s.matches(needle).count()
            };
            Value::Int(to_int(count))
        }
        Method::Index => Value::Int(
            s.find(needle)
                .map_or(-1, |byte| to_int(s[..byte].chars().count())),
        ),
        _ => Value::Bool(s.contains(needle)),
    };
    Ok(MethodOutcome::value(value))
}

/// `target[index]`
pub(crate) fn index(target: &Value, index: &Value) -> Result<Value> {
    match target {
        Value::List(items) => {
            let Some(i) = index.as_int() else {
                return Err(Error::type_error(format!(
                    "list indices must be integers or slices, not {}",
                    index.type_name()
                )));
            };
            normalize_index(i, items.len())
                .and_then(|i| items.get(i))
                .ok_or_else(|| Error::index_error("list index out of range"))
        }
        Value::String(s) => {
            let Some(i) = index.as_int() else {
                return Err(Error::type_error(format!(
                    "string indices must be integers, not '{}'",
                    index.type_name()
                )));
            };
            let len = s.chars().count();
            normalize_index(i, len)
                .and_then(|i| s.chars().nth(i))
                .map(|c| Value::string(c.to_string()))
                .ok_or_else(|| Error::index_error("string index out of range"))
        }
        other => Err(Error::type_error(format!(
            "'{}' object is not subscriptable",
            other.type_name()
        ))),
    }
}

fn slice_bound(value: &Value) -> Result<Option<i64>> {
    if value.is_none() {
        return Ok(None);
    }
    value.as_int().map(Some).ok_or_else(|| {
        Error::type_error("slice indices must be integers or None")
    })
}

/// Positions selected by `start:stop:step` over a sequence of `len` items.
fn slice_positions(
    len: usize,
    start: Option<i64>,
    stop: Option<i64>,
    step: i64,
) -> Vec<usize> {
    let len = to_int(len);
    let (lower, upper) = if step > 0 { (0, len) } else { (-1, len - 1) };
    let clamp = |bound: i64| {
        if bound < 0 {
            (bound + len).max(lower)
        } else {
            bound.min(upper)
        }
    };
    let start = start.map_or(if step > 0 { lower } else { upper }, clamp);
    let stop = stop.map_or(if step > 0 { upper } else { lower }, clamp);

    let mut positions = Vec::new();
    let mut i = start;
    while (step > 0 && i < stop) || (step < 0 && i > stop) {
        if let Ok(position) = usize::try_from(i) {
            positions.push(position);
        }
        i += step;
    }
    positions
}

/// `target[start:stop:step]`
pub(crate) fn slice(target: &Value, start: &Value, stop: &Value, step: &Value) -> Result<Value> {
    let (start, stop) = (slice_bound(start)?, slice_bound(stop)?);
    let step = slice_bound(step)?.unwrap_or(1);
    if step == 0 {
        return Err(Error::runtime("slice step cannot be zero"));
    }
    match target {
        Value::List(items) => {
            let items = items.to_vec();
            let positions = slice_positions(items.len(), start, stop, step);
            Ok(Value::list(positions.into_iter().map(|i| items[i].clone())))
        }
        Value::String(s) => {
            let chars: Vec<char> = s.chars().collect();
            let positions = slice_positions(chars.len(), start, stop, step);
            Ok(Value::string(positions.into_iter().map(|i| chars[i]).collect::<String>()))
        }
        other => Err(Error::type_error(format!(
            "'{}' object is not subscriptable",
            other.type_name()
        ))),
    }
}
