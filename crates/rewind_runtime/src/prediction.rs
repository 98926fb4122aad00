//! Grading guesses made while paused in prediction mode.
//!
//! A guess arrives as raw text. It is read as a literal (`None`, `True`,
//! numbers, quoted strings, bracketed lists) and compared with the value the
//! paused assignment stored. Anything that does not read as a literal is
//! taken as a bare string, and a top-level comma makes a list.

use rewind_foundation::Value;
use serde::{Deserialize, Serialize};

/// The graded result of one guess.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionOutcome {
    /// The variable the guess was about, e.g. `x` or `nums[1]`.
    pub variable: String,
    /// The guess as entered.
    pub guess: String,
    /// The stored value, rendered the way it appears in a list.
    pub expected: String,
    /// Whether the guess matched.
    pub correct: bool,
}

/// Grades `raw` against the value that was actually assigned.
#[must_use]
pub fn grade(variable: &str, raw: &str, correct_value: &Value) -> PredictionOutcome {
    let guess = parse_guess(raw);
    let exact_text = matches!(correct_value, Value::String(s) if &**s == raw.trim());
    PredictionOutcome {
        variable: variable.to_string(),
        guess: raw.trim().to_string(),
        expected: correct_value.repr(),
        correct: exact_text || guess == *correct_value,
    }
}

/// Reads a guess as a value.
#[must_use]
pub fn parse_guess(raw: &str) -> Value {
    let text = raw.trim();
    if let Some(inner) = text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        if let Some(items) = split_top_level(inner) {
            return Value::list(items.into_iter().map(parse_guess));
        }
    }
    if let Some(value) = parse_scalar(text) {
        return value;
    }
    match split_top_level(text) {
        Some(items) if items.len() > 1 => Value::list(items.into_iter().map(parse_guess)),
        _ => Value::string(text),
    }
}

fn parse_scalar(text: &str) -> Option<Value> {
    match text {
        "None" => return Some(Value::None),
        "True" => return Some(Value::Bool(true)),
        "False" => return Some(Value::Bool(false)),
        _ => {}
    }
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return Some(Value::string(&text[1..text.len() - 1]));
        }
    }
    if let Ok(n) = text.parse::<i64>() {
        return Some(Value::Int(n));
    }
    if text.chars().any(|c| c.is_ascii_digit()) {
        if let Ok(n) = text.parse::<f64>() {
            return Some(Value::Float(n));
        }
    }
    None
}

/// Splits on commas outside brackets and quotes.
///
/// Returns `None` when brackets or quotes are unbalanced. An empty or
/// whitespace-only input yields no items.
fn split_top_level(text: &str) -> Option<Vec<&str>> {
    if text.trim().is_empty() {
        return Some(Vec::new());
    }
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.checked_sub(1)?,
            (None, ',') if depth == 0 => {
                items.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 || quote.is_some() {
        return None;
    }
    items.push(text[start..].trim());
    Some(items)
}
