//! The execution state: everything a running program can observe or change.
//!
//! The state is mutated in place by exactly one driver at a time. Commands
//! change it through [`crate::vm::execute`]; undo records put it back through
//! [`UndoRecord::apply`](crate::UndoRecord::apply).

use std::collections::HashMap;

use rewind_foundation::{Error, Result, Value};

use crate::command::Command;
use crate::span::{ExpressionSpan, StatementSpan};

/// Name of the outermost scope.
pub const GLOBAL_SCOPE: &str = "Global";

/// Default limit on nested user-function calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1000;

/// A named variable frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scope {
    /// `Global` or the function's name.
    pub name: String,
    /// Identifier to value.
    pub bindings: HashMap<String, Value>,
}

impl Scope {
    /// Creates an empty scope.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bindings: HashMap::new(),
        }
    }
}

/// An active loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoopFrame {
    /// Where `continue` jumps.
    pub continue_target: usize,
    /// Where `break` jumps.
    pub break_target: usize,
    /// The `for` loop variable, if any.
    pub variable: Option<String>,
    /// Cursor of an enclosing loop over the same variable, set aside while
    /// this loop runs.
    pub shadowed_cursor: Option<usize>,
    /// Call depth the loop was entered at.
    pub call_depth: usize,
}

/// An active user-function call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallFrame {
    /// Index of the call command; execution resumes after it.
    pub return_pc: usize,
    /// The called function.
    pub function: String,
    /// Evaluation-stack depth once the arguments were popped.
    pub stack_depth: usize,
    /// Loop-stack depth at entry.
    pub loop_depth: usize,
}

/// A compiled function definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserFunction {
    /// The function's name.
    pub name: String,
    /// Parameter names, in order.
    pub params: Vec<String>,
    /// Index of the first body command in the flat program.
    pub start_index: usize,
    /// Number of body commands, including the trailing implicit return.
    pub body_len: usize,
}

impl UserFunction {
    /// Returns the function's body within the program it was defined in.
    #[must_use]
    pub fn body<'a>(&self, program: &'a [Command]) -> &'a [Command] {
        let end = (self.start_index + self.body_len).min(program.len());
        program.get(self.start_index..end).unwrap_or(&[])
    }
}

/// A variable assignment awaiting a guess.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingPrediction {
    /// The assigned variable, e.g. `x` or `grid[2]`.
    pub variable: String,
    /// The value that was assigned.
    pub correct_value: Value,
}

/// Prediction-mode flags.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Prediction {
    /// Whether assignments pause for a guess.
    pub enabled: bool,
    /// The assignment currently awaiting a guess.
    pub pending: Option<PendingPrediction>,
}

impl Prediction {
    /// Returns true while paused for a guess.
    #[must_use]
    pub const fn is_waiting(&self) -> bool {
        self.pending.is_some()
    }
}

/// The mutable runtime context of one compiled program.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionState {
    pub(crate) program_counter: usize,
    pub(crate) stack: Vec<Value>,
    pub(crate) scopes: Vec<Scope>,
    pub(crate) loops: Vec<LoopFrame>,
    pub(crate) calls: Vec<CallFrame>,
    pub(crate) functions: HashMap<String, UserFunction>,
    pub(crate) loop_cursors: HashMap<String, usize>,
    pub(crate) outputs: Vec<String>,
    pub(crate) error: Option<Error>,
    pub(crate) current_statement: Option<StatementSpan>,
    pub(crate) current_expression: Option<ExpressionSpan>,
    pub(crate) prediction: Prediction,
    pub(crate) max_call_depth: usize,
}

impl Default for ExecutionState {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionState {
    /// Creates a fresh state with an empty global scope.
    #[must_use]
    pub fn new() -> Self {
        Self {
            program_counter: 0,
            stack: Vec::new(),
            scopes: vec![Scope::new(GLOBAL_SCOPE)],
            loops: Vec::new(),
            calls: Vec::new(),
            functions: HashMap::new(),
            loop_cursors: HashMap::new(),
            outputs: Vec::new(),
            error: None,
            current_statement: None,
            current_expression: None,
            prediction: Prediction::default(),
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    /// Creates a fresh state whose global scope holds `bindings`.
    #[must_use]
    pub fn with_globals(bindings: HashMap<String, Value>) -> Self {
        let mut state = Self::new();
        state.scopes[0].bindings = bindings;
        state
    }

    /// Sets the limit on nested user-function calls.
    #[must_use]
    pub const fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Index of the next command to execute.
    #[must_use]
    pub const fn program_counter(&self) -> usize {
        self.program_counter
    }

    /// Moves the program counter.
    pub const fn set_program_counter(&mut self, pc: usize) {
        self.program_counter = pc;
    }

    /// The evaluation stack, bottom first.
    #[must_use]
    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    /// The scope stack; index 0 is the global scope.
    #[must_use]
    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// The innermost scope.
    #[must_use]
    pub fn active_scope(&self) -> &Scope {
        let last = self.scopes.len() - 1;
        &self.scopes[last]
    }

    /// Active loops, outermost first.
    #[must_use]
    pub fn loops(&self) -> &[LoopFrame] {
        &self.loops
    }

    /// Active calls, outermost first.
    #[must_use]
    pub fn calls(&self) -> &[CallFrame] {
        &self.calls
    }

    /// Defined functions by name.
    #[must_use]
    pub const fn functions(&self) -> &HashMap<String, UserFunction> {
        &self.functions
    }

    /// Next iteration index per active loop variable.
    #[must_use]
    pub const fn loop_cursors(&self) -> &HashMap<String, usize> {
        &self.loop_cursors
    }

    /// Printed lines, oldest first.
    #[must_use]
    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    /// The sticky error, if execution failed.
    #[must_use]
    pub const fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Records a failure; forward stepping stops until it is cleared.
    pub fn set_error(&mut self, error: Error) {
        self.error = Some(error);
    }

    /// Clears the sticky error.
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// The statement being executed.
    #[must_use]
    pub const fn current_statement(&self) -> Option<StatementSpan> {
        self.current_statement
    }

    /// The expression being evaluated.
    #[must_use]
    pub const fn current_expression(&self) -> Option<ExpressionSpan> {
        self.current_expression
    }

    /// Prediction-mode flags.
    #[must_use]
    pub const fn prediction(&self) -> &Prediction {
        &self.prediction
    }

    /// Turns prediction mode on or off.
    pub const fn set_prediction_mode(&mut self, enabled: bool) {
        self.prediction.enabled = enabled;
    }

    /// Clears a pending prediction, returning it.
    pub fn take_pending_prediction(&mut self) -> Option<PendingPrediction> {
        self.prediction.pending.take()
    }

    /// Limit on nested user-function calls.
    #[must_use]
    pub const fn max_call_depth(&self) -> usize {
        self.max_call_depth
    }

    /// The source line errors are attributed to.
    #[must_use]
    pub fn current_line(&self) -> Option<u32> {
        self.current_statement.map(|span| span.start_line)
    }

    // =========================================================================
    // Variables
    // =========================================================================

    /// Resolves a name in the innermost scope, then the global scope.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.active_scope()
            .bindings
            .get(name)
            .or_else(|| self.scopes[0].bindings.get(name))
            .cloned()
    }

    /// Binds a name in the innermost scope.
    ///
    /// Returns the scope's index and the value previously bound there.
    pub fn bind(&mut self, name: &str, value: Value) -> (usize, Option<Value>) {
        let index = self.scopes.len() - 1;
        let previous = self.scopes[index].bindings.insert(name.to_string(), value);
        (index, previous)
    }

    /// Every binding on the scope stack, deep-copied, with inner scopes
    /// shadowing outer ones.
    #[must_use]
    pub fn merged_bindings(&self) -> HashMap<String, Value> {
        let mut merged = HashMap::new();
        for scope in &self.scopes {
            for (name, value) in &scope.bindings {
                merged.insert(name.clone(), value.deep_copy());
            }
        }
        merged
    }

    /// Returns a copy of the state with every list duplicated.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        let mut copy = self.clone();
        for value in &mut copy.stack {
            *value = value.deep_copy();
        }
        for scope in &mut copy.scopes {
            for value in scope.bindings.values_mut() {
                *value = value.deep_copy();
            }
        }
        if let Some(pending) = &mut copy.prediction.pending {
            pending.correct_value = pending.correct_value.deep_copy();
        }
        copy
    }

    // =========================================================================
    // Evaluation stack
    // =========================================================================

    /// Pushes a value.
    pub fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    /// Clones the top `N` values, bottom first, without removing them.
    ///
    /// # Errors
    /// Returns a runtime error if fewer than `N` values are on the stack.
    pub fn top<const N: usize>(&self) -> Result<[Value; N]> {
        let len = self.stack.len();
        if len < N {
            return Err(underflow());
        }
        Ok(std::array::from_fn(|i| self.stack[len - N + i].clone()))
    }

    /// Clones the top `n` values, bottom first, without removing them.
    ///
    /// # Errors
    /// Returns a runtime error if fewer than `n` values are on the stack.
    pub fn top_n(&self, n: usize) -> Result<Vec<Value>> {
        let len = self.stack.len();
        if len < n {
            return Err(underflow());
        }
        Ok(self.stack[len - n..].to_vec())
    }

    /// Removes the top `n` values.
    pub fn discard(&mut self, n: usize) {
        let len = self.stack.len();
        self.stack.truncate(len.saturating_sub(n));
    }
}

fn underflow() -> Error {
    Error::runtime("evaluation stack underflow")
}
