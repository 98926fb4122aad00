//! Lexer, parser, compiler, and reversible command VM for Rewind.
//!
//! This crate provides:
//! - [`Lexer`] - Indentation-aware tokenization
//! - [`Parser`] - Parsing tokens into a [`Program`](ast::Program)
//! - [`Compile`] / [`ProgramTree`] - Lowering the tree to flat [`Command`]s
//! - [`ExecutionState`] - Everything a running program can observe
//! - [`execute`] - Running one command and returning its [`UndoRecord`]

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ast;
mod command;
mod compiler;
mod lexer;
mod operator;
mod parser;
mod span;
mod state;
mod template;
mod token;
mod undo;
pub mod vm;

pub use command::{Command, FunctionTemplate, jump_target};
pub use compiler::{Compile, ProgramTree, compile};
pub use lexer::Lexer;
pub use operator::{AssignOp, BinaryOp, Builtin, CompareOp, Method, UnaryOp};
pub use parser::{Parser, parse, parse_expression};
pub use span::{ExpressionSpan, Span, StatementSpan};
pub use state::{
    CallFrame, DEFAULT_MAX_CALL_DEPTH, ExecutionState, GLOBAL_SCOPE, LoopFrame, PendingPrediction,
    Prediction, Scope, UserFunction,
};
pub use template::{Template, TemplatePart};
pub use token::{Token, TokenKind};
pub use undo::UndoRecord;
pub use vm::{InputProvider, NoInput, ScriptedInput, execute, run};

use rewind_foundation::{Result, Value};

/// Evaluates a single expression on a fresh state.
///
/// # Errors
/// Returns a syntax error or the runtime error the expression raised.
pub fn eval(source: &str) -> Result<Value> {
    let commands = parse_expression(source)?.compile()?;
    let mut state = ExecutionState::new();
    run(&commands, &mut state, &mut NoInput)?;
    Ok(state.stack.pop().unwrap_or(Value::None))
}
