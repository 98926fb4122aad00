//! The reversible command interpreter.
//!
//! [`execute`] runs one command against an [`ExecutionState`] and returns the
//! [`UndoRecord`] that reverses it. Each command reads and validates
//! everything it needs before changing anything, so an `Err` leaves the state
//! untouched.
//!
//! Commands that change control flow set the program counter themselves;
//! the driver advances it by one only when a command left it unchanged.

#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::too_many_lines)]

mod builtins;
mod context;
mod interpolate;
mod methods;
mod operators;

pub use context::{InputProvider, NoInput, ScriptedInput};
pub use operators::{binary, compare, unary};

use rewind_foundation::{Error, Result, Value};
use tracing::trace;

use crate::command::{jump_target, Command, FunctionTemplate};
use crate::operator::AssignOp;
use crate::state::{CallFrame, ExecutionState, LoopFrame, PendingPrediction, Scope, UserFunction};
use crate::undo::UndoRecord;

/// Upper bound on the length of a list or string built by `range()` or
/// repetition.
const MAX_SEQUENCE_LEN: usize = 10_000_000;

/// Executes one command.
///
/// Errors carry the line of the statement being executed.
///
/// # Errors
/// Returns the runtime error the command raised; the state is unchanged.
pub fn execute(
    command: &Command,
    state: &mut ExecutionState,
    input: &mut dyn InputProvider,
) -> Result<UndoRecord> {
    trace!(pc = state.program_counter, %command, "execute");
    dispatch(command, state, input).map_err(|err| match state.current_line() {
        Some(line) => err.with_line(line),
        None => err,
    })
}

/// Runs `commands` from the current program counter to the end, discarding
/// undo records.
///
/// # Errors
/// Stops at and returns the first runtime error.
pub fn run(
    commands: &[Command],
    state: &mut ExecutionState,
    input: &mut dyn InputProvider,
) -> Result<()> {
    while let Some(command) = commands.get(state.program_counter) {
        let pc = state.program_counter;
        execute(command, state, input)?;
        if state.program_counter == pc {
            state.program_counter += 1;
        }
    }
    Ok(())
}

fn dispatch(
    command: &Command,
    state: &mut ExecutionState,
    input: &mut dyn InputProvider,
) -> Result<UndoRecord> {
    match command {
        // Stack bookkeeping
        Command::PushValue(value) => {
            state.push(value.clone());
            Ok(UndoRecord::stack(1, vec![]))
        }
        Command::PopValue => {
            let [value] = state.top()?;
            state.discard(1);
            Ok(UndoRecord::stack(0, vec![value]))
        }
        Command::RetrieveValue(name) => {
            let value = state.lookup(name).ok_or_else(|| Error::name_error(name))?;
            state.push(value);
            Ok(UndoRecord::stack(1, vec![]))
        }

        // Variable mutation
        Command::Assign { name, op } => assign(state, name, *op),
        Command::AssignIndexed { target, op } => assign_indexed(state, target, *op),
        Command::ForAdvance(variable) => for_advance(state, variable),

        // Control flow
        Command::ConditionalJump(offset) => {
            let [condition] = state.top()?;
            let pc = state.program_counter;
            let target = if condition.is_truthy() {
                None
            } else {
                Some(resolve_jump(pc, *offset)?)
            };
            state.discard(1);
            if let Some(target) = target {
                state.program_counter = target;
            }
            Ok(UndoRecord::Sequence(vec![
                UndoRecord::ProgramCounter(pc),
                UndoRecord::stack(0, vec![condition]),
            ]))
        }
        Command::Jump(offset) => {
            let pc = state.program_counter;
            state.program_counter = resolve_jump(pc, *offset)?;
            Ok(UndoRecord::ProgramCounter(pc))
        }
        Command::PushLoopBounds {
            continue_offset,
            break_offset,
            variable,
        } => push_loop_bounds(state, *continue_offset, *break_offset, variable.clone()),
        Command::PopLoopBounds => {
            let Some(frame) = state.loops.pop() else {
                return Err(Error::runtime("loop stack underflow"));
            };
            let cursor = leave_loop(state, &frame);
            Ok(UndoRecord::LoopExited { frame, cursor })
        }
        Command::Break => {
            let target = innermost_loop(state, "'break' outside loop")?.break_target;
            Ok(jump_to(state, target))
        }
        Command::Continue => {
            let target =
                innermost_loop(state, "'continue' not properly in loop")?.continue_target;
            Ok(jump_to(state, target))
        }

        // Operators
        Command::Binary(op) => {
            let [left, right] = state.top()?;
            let result = operators::binary(*op, &left, &right)?;
            Ok(replace_top(state, vec![left, right], result))
        }
        Command::Compare(op) => {
            let [left, right] = state.top()?;
            let result = operators::compare(*op, &left, &right)?;
            Ok(replace_top(state, vec![left, right], result))
        }
        Command::Unary(op) => {
            let [operand] = state.top()?;
            let result = operators::unary(*op, &operand)?;
            Ok(replace_top(state, vec![operand], result))
        }

        // Built-ins and methods
        Command::Builtin { function, argc } => {
            let args = state.top_n(*argc)?;
            let outcome = builtins::call(*function, &args, input)?;
            let mut undo = replace_top(state, args, outcome.value);
            if let Some(line) = outcome.printed {
                state.outputs.push(line);
                undo = UndoRecord::Sequence(vec![undo, UndoRecord::Output]);
            }
            Ok(undo)
        }
        Command::Method { method, argc } => {
            let values = state.top_n(argc + 1)?;
            let outcome = methods::call(*method, &values[0], &values[1..])?;
            let undo = replace_top(state, values, outcome.value);
            Ok(match outcome.previous {
                Some((list, contents)) => UndoRecord::Sequence(vec![
                    UndoRecord::ListContents { list, contents },
                    undo,
                ]),
                None => undo,
            })
        }
        Command::IndexAccess => {
            let [target, index] = state.top()?;
            let result = methods::index(&target, &index)?;
            Ok(replace_top(state, vec![target, index], result))
        }
        Command::Slice => {
            let [target, start, stop, step] = state.top()?;
            let result = methods::slice(&target, &start, &stop, &step)?;
            Ok(replace_top(state, vec![target, start, stop, step], result))
        }
        Command::CreateList(n) => {
            let items = state.top_n(*n)?;
            let list = Value::list(items.clone());
            Ok(replace_top(state, items, list))
        }

        // Functions
        Command::DefineFunction(template) => Ok(define_function(state, template)),
        Command::CallFunction { name, argc } => call_function(state, name, *argc),
        Command::Return => return_from_call(state),

        // Source mapping
        Command::HighlightStatement(span) => {
            let previous = state.current_statement.replace(*span);
            Ok(UndoRecord::Statement(previous))
        }
        Command::HighlightExpression(span) => {
            let previous = state.current_expression.replace(*span);
            Ok(UndoRecord::Expression(previous))
        }

        // Strings
        Command::Interpolate(template) => {
            let text = interpolate::render(template, state, input)?;
            state.push(Value::string(text));
            Ok(UndoRecord::stack(1, vec![]))
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Pops `consumed` (already cloned off the top) and pushes `result`.
fn replace_top(state: &mut ExecutionState, consumed: Vec<Value>, result: Value) -> UndoRecord {
    state.discard(consumed.len());
    state.push(result);
    UndoRecord::stack(1, consumed)
}

fn resolve_jump(pc: usize, offset: isize) -> Result<usize> {
    jump_target(pc, offset)
        .ok_or_else(|| Error::runtime(format!("jump {offset:+} from {pc} leaves the program")))
}

fn jump_to(state: &mut ExecutionState, target: usize) -> UndoRecord {
    let pc = state.program_counter;
    state.program_counter = target;
    UndoRecord::ProgramCounter(pc)
}

/// Pauses for a guess if prediction mode is on.
fn begin_prediction(state: &mut ExecutionState, variable: String, value: &Value) -> UndoRecord {
    if !state.prediction.enabled {
        return UndoRecord::Nothing;
    }
    let previous = state.prediction.pending.replace(PendingPrediction {
        variable,
        correct_value: value.deep_copy(),
    });
    UndoRecord::Prediction(previous)
}

fn assign(state: &mut ExecutionState, name: &str, op: AssignOp) -> Result<UndoRecord> {
    let [value] = state.top()?;
    let result = match op.binary() {
        None => value.clone(),
        Some(bin) => {
            let current = state.lookup(name).ok_or_else(|| Error::name_error(name))?;
            operators::binary(bin, &current, &value)?
        }
    };

    state.discard(1);
    let (scope, previous) = state.bind(name, result.clone());
    let prediction = begin_prediction(state, name.to_string(), &result);
    Ok(UndoRecord::sequence([
        UndoRecord::stack(0, vec![value]),
        UndoRecord::Binding {
            scope,
            name: name.to_string(),
            previous,
        },
        prediction,
    ]))
}

fn assign_indexed(state: &mut ExecutionState, label: &str, op: AssignOp) -> Result<UndoRecord> {
    let [target, index, value] = state.top()?;
    let Value::List(list) = &target else {
        return Err(Error::type_error(format!(
            "'{}' object does not support item assignment",
            target.type_name()
        )));
    };
    let Some(i) = index.as_int() else {
        return Err(Error::type_error(format!(
            "list indices must be integers or slices, not {}",
            index.type_name()
        )));
    };
    let position = methods::normalize_index(i, list.len())
        .ok_or_else(|| Error::index_error("list assignment index out of range"))?;
    let result = match op.binary() {
        None => value.clone(),
        Some(bin) => {
            let current = list.get(position).unwrap_or(Value::None);
            operators::binary(bin, &current, &value)?
        }
    };

    let list = list.clone();
    let contents = list.contents();
    list.set(position, result.clone());
    state.discard(3);
    let prediction = begin_prediction(state, format!("{label}[{position}]"), &result);
    Ok(UndoRecord::sequence([
        UndoRecord::stack(0, vec![target, index, value]),
        UndoRecord::ListContents { list, contents },
        prediction,
    ]))
}

fn for_advance(state: &mut ExecutionState, variable: &str) -> Result<UndoRecord> {
    let [iterable] = state.top()?;
    let cursor = state.loop_cursors.get(variable).copied().unwrap_or(0);
    let item = match &iterable {
        Value::List(items) => items.get(cursor),
        Value::String(s) => s.chars().nth(cursor).map(|c| Value::string(c.to_string())),
        other => {
            return Err(Error::type_error(format!(
                "'{}' object is not iterable",
                other.type_name()
            )));
        }
    };

    let Some(item) = item else {
        let previous = state.loop_cursors.remove(variable);
        state.push(Value::Bool(false));
        return Ok(UndoRecord::Sequence(vec![
            UndoRecord::Cursor {
                variable: variable.to_string(),
                previous,
            },
            UndoRecord::stack(1, vec![]),
        ]));
    };

    let (scope, previous_binding) = state.bind(variable, item.clone());
    let previous_cursor = state.loop_cursors.insert(variable.to_string(), cursor + 1);
    state.push(Value::Bool(true));
    let prediction = begin_prediction(state, variable.to_string(), &item);
    Ok(UndoRecord::sequence([
        UndoRecord::Binding {
            scope,
            name: variable.to_string(),
            previous: previous_binding,
        },
        UndoRecord::Cursor {
            variable: variable.to_string(),
            previous: previous_cursor,
        },
        UndoRecord::stack(1, vec![]),
        prediction,
    ]))
}

fn push_loop_bounds(
    state: &mut ExecutionState,
    continue_offset: isize,
    break_offset: isize,
    variable: Option<String>,
) -> Result<UndoRecord> {
    let pc = state.program_counter;
    let (Some(continue_target), Some(break_target)) = (
        pc.checked_add_signed(continue_offset),
        pc.checked_add_signed(break_offset),
    ) else {
        return Err(Error::runtime("loop bounds leave the program"));
    };
    // An enclosing loop over the same variable keeps its place.
    let shadowed_cursor = variable
        .as_deref()
        .and_then(|name| state.loop_cursors.remove(name));
    state.loops.push(LoopFrame {
        continue_target,
        break_target,
        variable,
        shadowed_cursor,
        call_depth: state.calls.len(),
    });
    Ok(UndoRecord::LoopEntered)
}

/// Drops a popped frame's cursor and restores the one it shadowed.
///
/// Returns the dropped cursor.
fn leave_loop(state: &mut ExecutionState, frame: &LoopFrame) -> Option<usize> {
    let name = frame.variable.as_ref()?;
    let cursor = state.loop_cursors.remove(name);
    if let Some(shadowed) = frame.shadowed_cursor {
        state.loop_cursors.insert(name.clone(), shadowed);
    }
    cursor
}

fn innermost_loop<'a>(state: &'a ExecutionState, message: &str) -> Result<&'a LoopFrame> {
    state
        .loops
        .last()
        .filter(|frame| frame.call_depth == state.calls.len())
        .ok_or_else(|| Error::runtime(message))
}

fn define_function(state: &mut ExecutionState, template: &FunctionTemplate) -> UndoRecord {
    let function = UserFunction {
        name: template.name.clone(),
        params: template.params.clone(),
        start_index: state.program_counter + 2,
        body_len: template.body_len,
    };
    let previous = state.functions.insert(template.name.clone(), function);
    UndoRecord::Function {
        name: template.name.clone(),
        previous,
    }
}

fn call_function(state: &mut ExecutionState, name: &str, argc: usize) -> Result<UndoRecord> {
    let function = state
        .functions
        .get(name)
        .cloned()
        .ok_or_else(|| Error::name_error(name))?;
    let expected = function.params.len();
    if expected != argc {
        return Err(Error::type_error(format!(
            "{name}() takes {expected} positional argument{} but {argc} {} given",
            if expected == 1 { "" } else { "s" },
            if argc == 1 { "was" } else { "were" },
        )));
    }
    if state.calls.len() >= state.max_call_depth {
        return Err(Error::runtime("maximum recursion depth exceeded"));
    }
    let arguments = state.top_n(argc)?;

    state.discard(argc);
    let mut scope = Scope::new(name);
    scope.bindings = function
        .params
        .iter()
        .cloned()
        .zip(arguments.iter().cloned())
        .collect();
    state.scopes.push(scope);
    let pc = state.program_counter;
    state.calls.push(CallFrame {
        return_pc: pc,
        function: name.to_string(),
        stack_depth: state.stack.len(),
        loop_depth: state.loops.len(),
    });
    state.program_counter = function.start_index;
    Ok(UndoRecord::Sequence(vec![
        UndoRecord::ProgramCounter(pc),
        UndoRecord::CallEntered { arguments },
    ]))
}

fn return_from_call(state: &mut ExecutionState) -> Result<UndoRecord> {
    let Some(frame) = state.calls.last().cloned() else {
        return Err(Error::runtime("'return' outside function"));
    };
    if state.scopes.len() < 2 {
        return Err(Error::runtime("call frame has no local scope"));
    }
    let [value] = state.top()?;

    state.discard(1);
    let depth = frame.stack_depth.min(state.stack.len());
    let discarded = state.stack.split_off(depth);
    let mut exited = Vec::new();
    while state.loops.len() > frame.loop_depth {
        if let Some(loop_frame) = state.loops.pop() {
            let cursor = leave_loop(state, &loop_frame);
            exited.push((loop_frame, cursor));
        }
    }
    let scope = state
        .scopes
        .pop()
        .unwrap_or_else(|| Scope::new(frame.function.clone()));
    state.calls.pop();
    let pc = state.program_counter;
    state.program_counter = frame.return_pc + 1;
    state.push(value);
    Ok(UndoRecord::Sequence(vec![
        UndoRecord::ProgramCounter(pc),
        UndoRecord::Returned {
            frame,
            scope,
            discarded,
            exited,
        },
    ]))
}
