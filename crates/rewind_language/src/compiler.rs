//! Compiler from syntax tree to flat command sequences.
//!
//! Every node compiles itself through [`Compile`]; children are compiled
//! first so their lengths are known when relative jump offsets are emitted.
//! Statements open with a statement highlight and expressions with an
//! expression highlight, so the stepper can show where execution is.

#![allow(clippy::cast_possible_wrap)]

use rewind_foundation::{Error, Result, Value};
use tracing::{debug, instrument};

use crate::ast::{
    ArgList, AssignTarget, Assignment, Block, Conditional, ExpressionNode, ForLoop,
    FunctionDefinition, MultiAssignment, Program, StatementNode, WhileLoop,
};
use crate::command::{Command, FunctionTemplate};
use crate::operator::{AssignOp, Builtin, Method};
use crate::parser::parse;
use crate::span::Span;

/// A node that lowers to commands.
pub trait Compile {
    /// Lowers this node.
    ///
    /// # Errors
    /// Returns an error for constructs that parse but cannot run, such as an
    /// unknown method or a mismatched multi-assignment.
    fn compile(&self) -> Result<Vec<Command>>;
}

/// A whole program tree.
pub trait ProgramTree {
    /// Lowers the tree into the flat program the stepper executes.
    ///
    /// # Errors
    /// See [`Compile::compile`].
    fn compile_program(&self) -> Result<Vec<Command>>;
}

impl ProgramTree for Program {
    #[instrument(level = "debug", skip_all)]
    fn compile_program(&self) -> Result<Vec<Command>> {
        let commands = self.body.compile()?;
        debug!(
            statements = self.body.statements.len(),
            commands = commands.len(),
            "compiled program"
        );
        Ok(commands)
    }
}

/// Parses and compiles source text.
///
/// # Errors
/// Returns the first syntax or compile error.
pub fn compile(source: &str) -> Result<Vec<Command>> {
    parse(source)?.compile_program()
}

fn offset(len: usize) -> isize {
    len as isize
}

fn highlight_statement(span: Span) -> Command {
    Command::HighlightStatement(span.statement())
}

fn highlight_expression(span: Span) -> Command {
    Command::HighlightExpression(span.expression())
}

// =============================================================================
// Statements
// =============================================================================

impl Compile for Block {
    fn compile(&self) -> Result<Vec<Command>> {
        let mut commands = Vec::new();
        for statement in &self.statements {
            commands.extend(statement.compile()?);
        }
        Ok(commands)
    }
}

impl Compile for StatementNode {
    fn compile(&self) -> Result<Vec<Command>> {
        match self {
            Self::Assignment(node) => node.compile(),
            Self::MultiAssignment(node) => node.compile(),
            Self::Return(value, span) => {
                let mut commands = vec![highlight_statement(*span)];
                match value {
                    Some(value) => commands.extend(value.compile()?),
                    None => commands.push(Command::PushValue(Value::None)),
                }
                commands.push(Command::Return);
                Ok(commands)
            }
            Self::Break(span) => Ok(vec![highlight_statement(*span), Command::Break]),
            Self::Continue(span) => Ok(vec![highlight_statement(*span), Command::Continue]),
            Self::Pass(span) => Ok(vec![highlight_statement(*span)]),
            Self::If(node) | Self::Elif(node) => node.compile(),
            Self::For(node) => node.compile(),
            Self::While(node) => node.compile(),
            Self::FunctionDefinition(node) => node.compile(),
            Self::Expression(expression, span) => {
                let mut commands = vec![highlight_statement(*span)];
                commands.extend(expression.compile()?);
                commands.push(Command::PopValue);
                Ok(commands)
            }
            Self::Block(block) => block.compile(),
        }
    }
}

impl Compile for Assignment {
    fn compile(&self) -> Result<Vec<Command>> {
        let mut commands = vec![highlight_statement(self.span)];
        match &self.target {
            AssignTarget::Name(name) => {
                commands.extend(self.value.compile()?);
                commands.push(Command::Assign {
                    name: name.clone(),
                    op: self.op,
                });
            }
            AssignTarget::Index {
                target,
                index,
                label,
            } => {
                commands.extend(target.compile()?);
                commands.extend(index.compile()?);
                commands.extend(self.value.compile()?);
                commands.push(Command::AssignIndexed {
                    target: label.clone(),
                    op: self.op,
                });
            }
        }
        Ok(commands)
    }
}

impl Compile for MultiAssignment {
    fn compile(&self) -> Result<Vec<Command>> {
        if self.targets.len() != self.values.len() {
            return Err(Error::parse(
                format!(
                    "cannot assign {} values to {} targets",
                    self.values.len(),
                    self.targets.len()
                ),
                self.span.line,
                self.span.column,
            ));
        }
        let mut commands = vec![highlight_statement(self.span)];
        for value in &self.values {
            commands.extend(value.compile()?);
        }
        // The last value is on top of the stack, so targets bind in reverse.
        for name in self.targets.iter().rev() {
            commands.push(Command::Assign {
                name: name.clone(),
                op: AssignOp::Set,
            });
        }
        Ok(commands)
    }
}

impl Compile for Conditional {
    fn compile(&self) -> Result<Vec<Command>> {
        let then_branch = self.then_branch.compile()?;
        let else_branch = match &self.else_branch {
            Some(branch) => branch.compile()?,
            None => Vec::new(),
        };

        let mut commands = vec![highlight_statement(self.span.to(self.condition.span()))];
        commands.extend(self.condition.compile()?);
        if else_branch.is_empty() {
            commands.push(Command::ConditionalJump(offset(then_branch.len() + 2)));
            commands.extend(then_branch);
        } else {
            commands.push(Command::ConditionalJump(offset(then_branch.len() + 3)));
            commands.extend(then_branch);
            commands.push(Command::Jump(offset(else_branch.len() + 2)));
            commands.extend(else_branch);
        }
        Ok(commands)
    }
}

impl Compile for ForLoop {
    fn compile(&self) -> Result<Vec<Command>> {
        let body = self.body.compile()?;
        let body_len = body.len();

        let mut commands = vec![highlight_statement(self.span.to(self.iterable.span()))];
        commands.extend(self.iterable.compile()?);
        commands.push(Command::PushLoopBounds {
            continue_offset: 1,
            break_offset: offset(body_len + 4),
            variable: Some(self.variable.clone()),
        });
        commands.push(Command::ForAdvance(self.variable.clone()));
        commands.push(Command::ConditionalJump(offset(body_len + 3)));
        commands.extend(body);
        commands.push(Command::Jump(-offset(body_len + 2)));
        commands.push(Command::PopValue);
        commands.push(Command::PopLoopBounds);
        Ok(commands)
    }
}

impl Compile for WhileLoop {
    fn compile(&self) -> Result<Vec<Command>> {
        let condition = self.condition.compile()?;
        let body = self.body.compile()?;
        let (condition_len, body_len) = (condition.len(), body.len());

        let mut commands = vec![highlight_statement(self.span.to(self.condition.span()))];
        commands.push(Command::PushLoopBounds {
            continue_offset: 1,
            break_offset: offset(body_len + condition_len + 3),
            variable: None,
        });
        commands.extend(condition);
        commands.push(Command::ConditionalJump(offset(body_len + 3)));
        commands.extend(body);
        commands.push(Command::Jump(-offset(body_len + condition_len + 1)));
        commands.push(Command::PopLoopBounds);
        Ok(commands)
    }
}

impl Compile for FunctionDefinition {
    fn compile(&self) -> Result<Vec<Command>> {
        let body = self.body.compile()?;
        let body_len = body.len();

        let mut commands = vec![
            highlight_statement(self.span.to(self.params.span)),
            Command::DefineFunction(FunctionTemplate {
                name: self.name.clone(),
                params: self.params.names.clone(),
                body_len: body_len + 2,
            }),
            Command::Jump(offset(body_len + 4)),
        ];
        commands.extend(body);
        commands.push(Command::PushValue(Value::None));
        commands.push(Command::Return);
        Ok(commands)
    }
}

// =============================================================================
// Expressions
// =============================================================================

impl Compile for ArgList {
    fn compile(&self) -> Result<Vec<Command>> {
        let mut commands = Vec::new();
        for item in &self.items {
            commands.extend(item.compile()?);
        }
        Ok(commands)
    }
}

impl Compile for ExpressionNode {
    fn compile(&self) -> Result<Vec<Command>> {
        let mut commands = match self {
            Self::Arguments(args) => return args.compile(),
            Self::Parameters(params) => {
                return Ok(params
                    .names
                    .iter()
                    .map(|name| Command::RetrieveValue(name.clone()))
                    .collect());
            }
            _ => vec![highlight_expression(self.span())],
        };

        match self {
            Self::Int(n, _) => commands.push(Command::PushValue(Value::Int(*n))),
            Self::Float(n, _) => commands.push(Command::PushValue(Value::Float(*n))),
            Self::String(s, _) => commands.push(Command::PushValue(Value::string(s))),
            Self::Bool(b, _) => commands.push(Command::PushValue(Value::Bool(*b))),
            Self::None(_) => commands.push(Command::PushValue(Value::None)),
            Self::FString(template, _) => commands.push(Command::Interpolate(template.clone())),
            Self::Identifier(name, _) => commands.push(Command::RetrieveValue(name.clone())),
            Self::Ternary {
                condition,
                then_value,
                else_value,
                ..
            } => {
                let then_value = then_value.compile()?;
                let else_value = else_value.compile()?;
                commands.extend(condition.compile()?);
                commands.push(Command::ConditionalJump(offset(then_value.len() + 3)));
                commands.extend(then_value);
                commands.push(Command::Jump(offset(else_value.len() + 2)));
                commands.extend(else_value);
            }
            Self::Comparison {
                op, left, right, ..
            } => {
                commands.extend(left.compile()?);
                commands.extend(right.compile()?);
                commands.push(Command::Compare(*op));
            }
            Self::Binary {
                op, left, right, ..
            } => {
                commands.extend(left.compile()?);
                commands.extend(right.compile()?);
                commands.push(Command::Binary(*op));
            }
            Self::Unary { op, operand, .. } => {
                commands.extend(operand.compile()?);
                commands.push(Command::Unary(*op));
            }
            Self::Call { name, args, .. } => {
                commands.extend(args.compile()?);
                let argc = args.items.len();
                commands.push(match Builtin::from_name(name) {
                    Some(function) => Command::Builtin { function, argc },
                    None => Command::CallFunction {
                        name: name.clone(),
                        argc,
                    },
                });
            }
            Self::Index { target, index, .. } => {
                commands.extend(target.compile()?);
                commands.extend(index.compile()?);
                commands.push(Command::IndexAccess);
            }
            Self::MethodCall {
                receiver,
                method,
                args,
                span,
            } => {
                let Some(resolved) = Method::from_name(method) else {
                    return Err(Error::parse(
                        format!("unknown method '{method}'"),
                        span.line,
                        span.column,
                    ));
                };
                commands.extend(receiver.compile()?);
                commands.extend(args.compile()?);
                commands.push(Command::Method {
                    method: resolved,
                    argc: args.items.len(),
                });
            }
            Self::Slice {
                target,
                start,
                stop,
                step,
                ..
            } => {
                commands.extend(target.compile()?);
                for bound in [start, stop, step] {
                    match bound {
                        Some(bound) => commands.extend(bound.compile()?),
                        None => commands.push(Command::PushValue(Value::None)),
                    }
                }
                commands.push(Command::Slice);
            }
            Self::List(items, _) => {
                for item in items {
                    commands.extend(item.compile()?);
                }
                commands.push(Command::CreateList(items.len()));
            }
            Self::Arguments(_) | Self::Parameters(_) => {}
        }
        Ok(commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::{BinaryOp, CompareOp};
    use crate::parser::parse_expression;

    fn program(source: &str) -> Vec<Command> {
        compile(source).unwrap()
    }

    fn without_highlights(commands: &[Command]) -> Vec<Command> {
        commands
            .iter()
            .filter(|c| {
                !matches!(
                    c,
                    Command::HighlightStatement(_) | Command::HighlightExpression(_)
                )
            })
            .cloned()
            .collect()
    }

    #[test]
    fn assignment_layout() {
        let commands = program("x = 1 + 2\n");
        assert!(matches!(commands[0], Command::HighlightStatement(_)));
        assert_eq!(
            without_highlights(&commands),
            vec![
                Command::PushValue(Value::Int(1)),
                Command::PushValue(Value::Int(2)),
                Command::Binary(BinaryOp::Add),
                Command::Assign {
                    name: "x".into(),
                    op: AssignOp::Set
                },
            ]
        );
    }

    #[test]
    fn if_without_else_skips_then_branch() {
        let commands = program("if x:\n    y = 1\n");
        let jump = commands
            .iter()
            .position(|c| matches!(c, Command::ConditionalJump(_)))
            .unwrap();
        let Command::ConditionalJump(n) = commands[jump] else {
            unreachable!()
        };
        let target = crate::jump_target(jump, n).unwrap();
        assert_eq!(target, commands.len());
    }

    #[test]
    fn if_else_jumps_land_on_branch_boundaries() {
        let commands = program("if x:\n    y = 1\nelse:\n    y = 2\n    z = 3\n");
        let cj = commands
            .iter()
            .position(|c| matches!(c, Command::ConditionalJump(_)))
            .unwrap();
        let jump = commands
            .iter()
            .position(|c| matches!(c, Command::Jump(_)))
            .unwrap();
        let (Command::ConditionalJump(a), Command::Jump(b)) = (&commands[cj], &commands[jump])
        else {
            unreachable!()
        };
        assert_eq!(crate::jump_target(cj, *a), Some(jump + 1));
        assert_eq!(crate::jump_target(jump, *b), Some(commands.len()));
    }

    #[test]
    fn for_loop_layout() {
        let commands = program("for i in xs:\n    pass\n");
        // hs, hx, load xs, bounds, advance, cj, hs(pass), jump, pop, exit
        assert_eq!(commands.len(), 10);
        assert_eq!(
            commands[3],
            Command::PushLoopBounds {
                continue_offset: 1,
                break_offset: 5,
                variable: Some("i".into())
            }
        );
        assert_eq!(commands[5], Command::ConditionalJump(4));
        assert_eq!(crate::jump_target(5, 4), Some(8));
        assert_eq!(commands[7], Command::Jump(-3));
        assert_eq!(crate::jump_target(7, -3), Some(4));
        assert_eq!(commands[8], Command::PopValue);
        assert_eq!(commands[9], Command::PopLoopBounds);
    }

    #[test]
    fn while_loop_layout() {
        let commands = program("while x:\n    pass\n");
        // hs, bounds, hx, load x, cj, hs(pass), jump, exit
        assert_eq!(commands.len(), 8);
        assert_eq!(
            commands[1],
            Command::PushLoopBounds {
                continue_offset: 1,
                break_offset: 6,
                variable: None
            }
        );
        assert_eq!(crate::jump_target(4, 4), Some(7));
        assert_eq!(commands[4], Command::ConditionalJump(4));
        assert_eq!(commands[6], Command::Jump(-4));
        assert_eq!(crate::jump_target(6, -4), Some(2));
        assert_eq!(commands[7], Command::PopLoopBounds);
    }

    #[test]
    fn function_definition_skips_body() {
        let commands = program("def f(a):\n    return a\n");
        let Command::DefineFunction(template) = &commands[1] else {
            panic!("expected definition, got {:?}", commands[1]);
        };
        assert_eq!(template.params, vec!["a".to_string()]);
        let Command::Jump(n) = commands[2] else {
            panic!("expected jump");
        };
        assert_eq!(crate::jump_target(2, n), Some(commands.len()));
        assert_eq!(template.body_len, commands.len() - 3);
        assert_eq!(commands[commands.len() - 1], Command::Return);
        assert_eq!(commands[commands.len() - 2], Command::PushValue(Value::None));
    }

    #[test]
    fn builtins_take_precedence_over_user_functions() {
        let commands = program("print(1)\nf(1, 2)\n");
        assert!(commands.contains(&Command::Builtin {
            function: Builtin::Print,
            argc: 1
        }));
        assert!(commands.contains(&Command::CallFunction {
            name: "f".into(),
            argc: 2
        }));
    }

    #[test]
    fn multi_assignment_binds_in_reverse() {
        let commands = without_highlights(&program("a, b = 1, 2\n"));
        assert_eq!(
            commands[2..],
            [
                Command::Assign {
                    name: "b".into(),
                    op: AssignOp::Set
                },
                Command::Assign {
                    name: "a".into(),
                    op: AssignOp::Set
                },
            ]
        );
    }

    #[test]
    fn multi_assignment_count_mismatch() {
        let err = compile("a, b = 1, 2, 3\n").unwrap_err();
        assert!(err.is_parse_failure());
    }

    #[test]
    fn unknown_method_is_rejected() {
        let err = compile("xs.shuffle()\n").unwrap_err();
        assert!(err.to_string().contains("shuffle"));
    }

    #[test]
    fn slice_fills_missing_bounds() {
        let expression = parse_expression("xs[1:]").unwrap();
        let commands = without_highlights(&expression.compile().unwrap());
        assert_eq!(
            commands,
            vec![
                Command::RetrieveValue("xs".into()),
                Command::PushValue(Value::Int(1)),
                Command::PushValue(Value::None),
                Command::PushValue(Value::None),
                Command::Slice,
            ]
        );
    }

    #[test]
    fn ternary_layout() {
        let expression = parse_expression("1 if c else 2").unwrap();
        let commands = expression.compile().unwrap();
        let cj = commands
            .iter()
            .position(|c| matches!(c, Command::ConditionalJump(_)))
            .unwrap();
        let Command::ConditionalJump(n) = commands[cj] else {
            unreachable!()
        };
        assert_eq!(commands[crate::jump_target(cj, n).unwrap() - 1], Command::Jump(4));
    }

    #[test]
    fn parameters_and_arguments_have_no_highlight() {
        let params = ExpressionNode::Parameters(crate::ast::FormalParams {
            names: vec!["a".into(), "b".into()],
            span: Span::at_start(),
        });
        assert_eq!(
            params.compile().unwrap(),
            vec![
                Command::RetrieveValue("a".into()),
                Command::RetrieveValue("b".into())
            ]
        );
    }

    #[test]
    fn comparison_chain_compiles() {
        let commands = without_highlights(&program("r = 1 < 2 < 3\n"));
        let compares = commands
            .iter()
            .filter(|c| matches!(c, Command::Compare(CompareOp::Lt)))
            .count();
        assert_eq!(compares, 2);
    }
}
