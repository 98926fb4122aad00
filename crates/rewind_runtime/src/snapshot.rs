//! Read-only projections of a stepper for a presentation layer.
//!
//! A [`Snapshot`] copies everything a UI shows after each step out of the
//! live state. Values become plain [`SnapshotValue`] trees, so a snapshot
//! never aliases the program's lists and can be shipped to another process
//! as `MessagePack`.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;

use rewind_foundation::{Error, Value, format_float};
use rewind_language::{ExpressionSpan, Scope, StatementSpan, UserFunction};
use serde::{Deserialize, Serialize};

use crate::error::{HostError, HostResult};
use crate::prediction::PredictionOutcome;

/// A value copied out of the execution state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SnapshotValue {
    /// `None`.
    None,
    /// A boolean.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A float.
    Float(f64),
    /// A string.
    Str(String),
    /// A list.
    List(Vec<SnapshotValue>),
    /// A list that contains itself, at the point it recurs.
    Cycle,
}

impl SnapshotValue {
    /// Copies a live value.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        copy(value, &mut Vec::new())
    }

    /// Renders the value as it appears inside a list.
    #[must_use]
    pub fn repr(&self) -> String {
        match self {
            Self::Str(s) => Value::string(s).repr(),
            other => other.to_string(),
        }
    }
}

fn copy(value: &Value, open: &mut Vec<usize>) -> SnapshotValue {
    match value {
        Value::None => SnapshotValue::None,
        Value::Bool(b) => SnapshotValue::Bool(*b),
        Value::Int(n) => SnapshotValue::Int(*n),
        Value::Float(n) => SnapshotValue::Float(*n),
        Value::String(s) => SnapshotValue::Str(s.to_string()),
        Value::List(list) => {
            if open.contains(&list.id()) {
                return SnapshotValue::Cycle;
            }
            open.push(list.id());
            let items = list.to_vec().iter().map(|item| copy(item, open)).collect();
            open.pop();
            SnapshotValue::List(items)
        }
    }
}

impl fmt::Display for SnapshotValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Bool(true) => write!(f, "True"),
            Self::Bool(false) => write!(f, "False"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{}", format_float(*n)),
            Self::Str(s) => write!(f, "{s}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item.repr())?;
                }
                write!(f, "]")
            }
            Self::Cycle => write!(f, "[...]"),
        }
    }
}

/// One frame of the scope stack.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScopeSnapshot {
    /// `Global` or the called function's name.
    pub name: String,
    /// Bindings, sorted by name.
    pub variables: BTreeMap<String, SnapshotValue>,
}

impl ScopeSnapshot {
    fn from_scope(scope: &Scope) -> Self {
        Self {
            name: scope.name.clone(),
            variables: copy_bindings(&scope.bindings),
        }
    }
}

/// A defined function.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSnapshot {
    /// Function name.
    pub name: String,
    /// Parameter names in order.
    pub params: Vec<String>,
    /// Index of the first body command.
    pub start_index: usize,
    /// Number of body commands.
    pub body_len: usize,
}

impl From<&UserFunction> for FunctionSnapshot {
    fn from(function: &UserFunction) -> Self {
        Self {
            name: function.name.clone(),
            params: function.params.clone(),
            start_index: function.start_index,
            body_len: function.body_len,
        }
    }
}

/// Everything a presentation layer shows after a step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Bindings of the active scope.
    pub variables: BTreeMap<String, SnapshotValue>,
    /// Printed lines so far.
    pub outputs: Vec<String>,
    /// Whether `step_forward` can make progress.
    pub can_step_forward: bool,
    /// Whether `step_back` can make progress.
    pub can_step_backward: bool,
    /// Commands executed so far.
    pub current_step: usize,
    /// Commands in the compiled program.
    pub total_steps: usize,
    /// The statement being executed.
    pub highlighted_statement: Option<StatementSpan>,
    /// The expression being evaluated.
    pub highlighted_expression: Option<ExpressionSpan>,
    /// Defined functions, sorted by name.
    pub functions: Vec<FunctionSnapshot>,
    /// The scope stack, global first.
    pub scopes: Vec<ScopeSnapshot>,
    /// Position of each active `for` loop, by loop variable.
    pub loop_iterations: BTreeMap<String, usize>,
    /// The error that stopped the program.
    pub error: Option<Error>,
    /// Why the source failed to compile.
    pub parse_error: Option<String>,
    /// Whether an assignment is waiting for a guess.
    pub waiting_for_prediction: bool,
    /// The variable being guessed.
    pub prediction_variable: Option<String>,
    /// The value being guessed.
    pub prediction_correct_value: Option<SnapshotValue>,
    /// The most recently graded guess.
    pub last_prediction: Option<PredictionOutcome>,
}

pub(crate) fn copy_bindings(bindings: &HashMap<String, Value>) -> BTreeMap<String, SnapshotValue> {
    bindings
        .iter()
        .map(|(name, value)| (name.clone(), SnapshotValue::from_value(value)))
        .collect()
}

impl Snapshot {
    /// Copies the scope stack out of `scopes`.
    pub(crate) fn scopes_of(scopes: &[Scope]) -> Vec<ScopeSnapshot> {
        scopes.iter().map(ScopeSnapshot::from_scope).collect()
    }

    /// Copies the function table, sorted by name.
    pub(crate) fn functions_of(functions: &HashMap<String, UserFunction>) -> Vec<FunctionSnapshot> {
        let mut table: Vec<FunctionSnapshot> = functions.values().map(Into::into).collect();
        table.sort_by(|a, b| a.name.cmp(&b.name));
        table
    }
}

// =============================================================================
// Encoding
// =============================================================================

/// Serializes a snapshot to bytes using `MessagePack` format.
///
/// Uses named serialization to preserve struct field names.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_bytes(snapshot: &Snapshot) -> HostResult<Vec<u8>> {
    Ok(rmp_serde::to_vec_named(snapshot)?)
}

/// Deserializes a snapshot from `MessagePack` bytes.
///
/// # Errors
///
/// Returns an error if deserialization fails.
pub fn from_bytes(bytes: &[u8]) -> HostResult<Snapshot> {
    Ok(rmp_serde::from_slice(bytes)?)
}

/// Writes a snapshot to a file.
///
/// # Errors
///
/// Returns an error if encoding fails or the file cannot be written.
pub fn save_to_file<P: AsRef<Path>>(snapshot: &Snapshot, path: P) -> HostResult<()> {
    let bytes = to_bytes(snapshot)?;
    fs::write(path.as_ref(), bytes)
        .map_err(|e| HostError::io("failed to write", path.as_ref(), e))
}

/// Reads a snapshot from a file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> HostResult<Snapshot> {
    let bytes =
        fs::read(path.as_ref()).map_err(|e| HostError::io("failed to read", path.as_ref(), e))?;
    from_bytes(&bytes)
}
