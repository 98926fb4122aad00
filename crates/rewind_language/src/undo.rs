//! Undo records: the exact inverse of one executed command.
//!
//! Every successful [`execute`](crate::vm::execute) returns an [`UndoRecord`]
//! holding just enough of the prior state to put it back. Records are pure
//! data; [`UndoRecord::apply`] is the single dispatcher that interprets them.

use im::Vector;
use rewind_foundation::{List, Value};

use crate::span::{ExpressionSpan, StatementSpan};
use crate::state::{
    CallFrame, ExecutionState, LoopFrame, PendingPrediction, Scope, UserFunction,
};

/// Saved state needed to reverse one command.
#[derive(Clone, Debug, PartialEq)]
pub enum UndoRecord {
    /// The command changed nothing.
    Nothing,
    /// Drop `pushed` values from the top of the stack, then push `restored`.
    Stack {
        /// Values the command pushed.
        pushed: usize,
        /// Values the command popped, bottom first.
        restored: Vec<Value>,
    },
    /// Restore the program counter.
    ProgramCounter(usize),
    /// Restore (or remove) a binding in one scope.
    Binding {
        /// Index into the scope stack.
        scope: usize,
        /// The variable.
        name: String,
        /// The previous value, or `None` if the name was unbound.
        previous: Option<Value>,
    },
    /// Restore a list's contents in place.
    ListContents {
        /// The mutated list; identity is preserved.
        list: List,
        /// Its contents before the command ran.
        contents: Vector<Value>,
    },
    /// Restore (or remove) a loop cursor.
    Cursor {
        /// The loop variable.
        variable: String,
        /// The previous cursor.
        previous: Option<usize>,
    },
    /// Leave the loop the command entered.
    LoopEntered,
    /// Re-enter a loop the command left.
    LoopExited {
        /// The removed frame.
        frame: LoopFrame,
        /// The loop's cursor at exit.
        cursor: Option<usize>,
    },
    /// Restore (or remove) a function definition.
    Function {
        /// The function's name.
        name: String,
        /// The previous definition.
        previous: Option<UserFunction>,
    },
    /// Remove the last printed line.
    Output,
    /// Restore the statement highlight.
    Statement(Option<StatementSpan>),
    /// Restore the expression highlight.
    Expression(Option<ExpressionSpan>),
    /// Leave a call frame and put its arguments back on the stack.
    CallEntered {
        /// The popped arguments, in order.
        arguments: Vec<Value>,
    },
    /// Re-enter a call the command returned from.
    Returned {
        /// The removed call frame.
        frame: CallFrame,
        /// The removed local scope.
        scope: Scope,
        /// Stack values discarded below the return value.
        discarded: Vec<Value>,
        /// Loops left by the return, innermost first.
        exited: Vec<(LoopFrame, Option<usize>)>,
    },
    /// Restore the pending prediction.
    Prediction(Option<PendingPrediction>),
    /// Clear the sticky error a failed command raised.
    Failed,
    /// Several records, undone last first.
    Sequence(Vec<UndoRecord>),
}

impl UndoRecord {
    /// Record for a command that pops `restored` and pushes `pushed` values.
    #[must_use]
    pub const fn stack(pushed: usize, restored: Vec<Value>) -> Self {
        Self::Stack { pushed, restored }
    }

    /// Combines records, dropping no-ops.
    #[must_use]
    pub fn sequence(records: impl IntoIterator<Item = Self>) -> Self {
        let mut records: Vec<Self> = records
            .into_iter()
            .filter(|record| !matches!(record, Self::Nothing))
            .collect();
        match records.len() {
            0 => Self::Nothing,
            1 => records.remove(0),
            _ => Self::Sequence(records),
        }
    }

    /// Reverses the command this record was produced by.
    pub fn apply(self, state: &mut ExecutionState) {
        match self {
            Self::Nothing => {}
            Self::Stack { pushed, restored } => {
                state.discard(pushed);
                state.stack.extend(restored);
            }
            Self::ProgramCounter(pc) => state.program_counter = pc,
            Self::Binding {
                scope,
                name,
                previous,
            } => {
                if let Some(scope) = state.scopes.get_mut(scope) {
                    match previous {
                        Some(value) => {
                            scope.bindings.insert(name, value);
                        }
                        None => {
                            scope.bindings.remove(&name);
                        }
                    }
                }
            }
            Self::ListContents { list, contents } => list.replace(contents),
            Self::Cursor { variable, previous } => restore_cursor(state, variable, previous),
            Self::LoopEntered => {
                if let Some(frame) = state.loops.pop() {
                    if let Some(variable) = frame.variable {
                        restore_cursor(state, variable, frame.shadowed_cursor);
                    }
                }
            }
            Self::LoopExited { frame, cursor } => reenter_loop(state, frame, cursor),
            Self::Function { name, previous } => match previous {
                Some(function) => {
                    state.functions.insert(name, function);
                }
                None => {
                    state.functions.remove(&name);
                }
            },
            Self::Output => {
                state.outputs.pop();
            }
            Self::Statement(previous) => state.current_statement = previous,
            Self::Expression(previous) => state.current_expression = previous,
            Self::CallEntered { arguments } => {
                state.calls.pop();
                if state.scopes.len() > 1 {
                    state.scopes.pop();
                }
                state.stack.extend(arguments);
            }
            Self::Returned {
                frame,
                scope,
                discarded,
                exited,
            } => {
                let value = state.stack.pop();
                state.stack.extend(discarded);
                state.stack.extend(value);
                for (loop_frame, cursor) in exited.into_iter().rev() {
                    reenter_loop(state, loop_frame, cursor);
                }
                state.scopes.push(scope);
                state.calls.push(frame);
            }
            Self::Prediction(previous) => state.prediction.pending = previous,
            Self::Failed => state.error = None,
            Self::Sequence(records) => {
                for record in records.into_iter().rev() {
                    record.apply(state);
                }
            }
        }
    }
}

fn restore_cursor(state: &mut ExecutionState, variable: String, previous: Option<usize>) {
    match previous {
        Some(cursor) => {
            state.loop_cursors.insert(variable, cursor);
        }
        None => {
            state.loop_cursors.remove(&variable);
        }
    }
}

fn reenter_loop(state: &mut ExecutionState, frame: LoopFrame, cursor: Option<usize>) {
    if let Some(variable) = &frame.variable {
        restore_cursor(state, variable.clone(), cursor);
    }
    state.loops.push(frame);
}
