//! The command catalog: the instruction set of the stepping VM.
//!
//! A compiled program is a flat `Vec<Command>`. Commands are immutable
//! program data; executing one (see [`crate::vm::execute`]) mutates the
//! [`ExecutionState`](crate::ExecutionState) and returns the
//! [`UndoRecord`](crate::UndoRecord) that reverses it.
//!
//! Jump offsets are relative to the jump's own index. A positive offset `n`
//! lands on `index + n - 1`; zero or a negative offset lands on `index + n`.

use std::fmt;

use rewind_foundation::Value;

use crate::operator::{AssignOp, BinaryOp, Builtin, CompareOp, Method, UnaryOp};
use crate::span::{ExpressionSpan, StatementSpan};
use crate::template::Template;

/// Compile-time description of a user function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionTemplate {
    /// The function's name.
    pub name: String,
    /// Parameter names, in order.
    pub params: Vec<String>,
    /// Number of commands in the inlined body, including the trailing
    /// implicit `return None`.
    pub body_len: usize,
}

/// One atomic, reversible unit of program behavior.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    // Stack bookkeeping
    /// Push a constant.
    PushValue(Value),
    /// Discard the top of the stack.
    PopValue,
    /// Push the value bound to a name.
    RetrieveValue(String),

    // Variable mutation
    /// Pop a value and bind (or compound-assign) it to a name.
    Assign {
        /// The variable.
        name: String,
        /// `=`, `+=` or `-=`.
        op: AssignOp,
    },
    /// Pop list, index, and value; store into the list.
    AssignIndexed {
        /// How the target list is displayed, e.g. `grid[0]`.
        target: String,
        /// `=`, `+=` or `-=`.
        op: AssignOp,
    },
    /// Bind the loop variable to the next element of the iterable on top of
    /// the stack and push whether one was available.
    ForAdvance(String),

    // Control flow
    /// Pop a value; jump when it is falsy.
    ConditionalJump(isize),
    /// Jump unconditionally.
    Jump(isize),
    /// Enter a loop, recording its continue and break targets.
    PushLoopBounds {
        /// Offset of the continue target.
        continue_offset: isize,
        /// Offset of the break target.
        break_offset: isize,
        /// The `for` loop variable, if any.
        variable: Option<String>,
    },
    /// Leave the innermost loop.
    PopLoopBounds,
    /// Jump to the innermost loop's break target.
    Break,
    /// Jump to the innermost loop's continue target.
    Continue,

    // Operators
    /// Pop two operands, push the result.
    Binary(BinaryOp),
    /// Pop two operands, push the comparison result.
    Compare(CompareOp),
    /// Pop one operand, push the result.
    Unary(UnaryOp),

    // Built-ins and methods
    /// Pop `argc` arguments, push the built-in's result.
    Builtin {
        /// The built-in.
        function: Builtin,
        /// Number of arguments on the stack.
        argc: usize,
    },
    /// Pop a receiver and `argc` arguments, push the method's result.
    Method {
        /// The method.
        method: Method,
        /// Number of arguments on the stack.
        argc: usize,
    },
    /// Pop target and index, push the element.
    IndexAccess,
    /// Pop target, start, stop, and step, push the slice.
    Slice,
    /// Pop `n` values, push a new list holding them.
    CreateList(usize),

    // Functions
    /// Register a user function whose body follows the next jump.
    DefineFunction(FunctionTemplate),
    /// Pop `argc` arguments and enter a user function.
    CallFunction {
        /// The called function.
        name: String,
        /// Number of arguments on the stack.
        argc: usize,
    },
    /// Pop the return value, leave the current function, push the value.
    Return,

    // Source mapping
    /// Record the statement being executed.
    HighlightStatement(StatementSpan),
    /// Record the expression being evaluated.
    HighlightExpression(ExpressionSpan),

    // Strings
    /// Evaluate an f-string and push the result.
    Interpolate(Template),
}

impl Command {
    /// Returns true if executing this command is a user-visible step.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        !matches!(
            self,
            Self::PushValue(_)
                | Self::PopValue
                | Self::RetrieveValue(_)
                | Self::ConditionalJump(_)
                | Self::Jump(_)
                | Self::PushLoopBounds { .. }
                | Self::PopLoopBounds
                | Self::HighlightStatement(_)
                | Self::HighlightExpression(_)
        )
    }
}

/// Resolves a relative jump offset from the jump at `index`.
///
/// Returns `None` if the target would fall before the start of the program.
#[must_use]
pub const fn jump_target(index: usize, offset: isize) -> Option<usize> {
    let displacement = if offset > 0 { offset - 1 } else { offset };
    index.checked_add_signed(displacement)
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PushValue(v) => write!(f, "push {}", v.repr()),
            Self::PopValue => write!(f, "pop"),
            Self::RetrieveValue(name) => write!(f, "load {name}"),
            Self::Assign { name, op } => write!(f, "assign {name} {op}"),
            Self::AssignIndexed { target, op } => write!(f, "assign {target}[] {op}"),
            Self::ForAdvance(name) => write!(f, "advance {name}"),
            Self::ConditionalJump(n) => write!(f, "jump-if-false {n:+}"),
            Self::Jump(n) => write!(f, "jump {n:+}"),
            Self::PushLoopBounds {
                continue_offset,
                break_offset,
                variable,
            } => {
                write!(f, "loop-enter continue {continue_offset:+} break {break_offset:+}")?;
                if let Some(variable) = variable {
                    write!(f, " ({variable})")?;
                }
                Ok(())
            }
            Self::PopLoopBounds => write!(f, "loop-exit"),
            Self::Break => write!(f, "break"),
            Self::Continue => write!(f, "continue"),
            Self::Binary(op) => write!(f, "binary {op}"),
            Self::Compare(op) => write!(f, "compare {op}"),
            Self::Unary(op) => write!(f, "unary {op}"),
            Self::Builtin { function, argc } => write!(f, "call {}/{argc}", function.name()),
            Self::Method { method, argc } => write!(f, "method .{}/{argc}", method.name()),
            Self::IndexAccess => write!(f, "index"),
            Self::Slice => write!(f, "slice"),
            Self::CreateList(n) => write!(f, "list {n}"),
            Self::DefineFunction(template) => write!(
                f,
                "def {}({}) [{} commands]",
                template.name,
                template.params.join(", "),
                template.body_len
            ),
            Self::CallFunction { name, argc } => write!(f, "call {name}/{argc}"),
            Self::Return => write!(f, "return"),
            Self::HighlightStatement(span) => {
                write!(f, "-- line {}..{}", span.start_line, span.end_line)
            }
            Self::HighlightExpression(span) => write!(
                f,
                "-- expr {}:{}..{}",
                span.line, span.start_column, span.end_column
            ),
            Self::Interpolate(template) => write!(f, "format ({} parts)", template.parts.len()),
        }
    }
}
