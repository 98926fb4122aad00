//! Abstract syntax tree for the Rewind language.
//!
//! Two node families: [`StatementNode`] and [`ExpressionNode`]. Every node
//! carries the [`Span`] it was parsed from; the compiler turns those spans
//! into highlight commands.

use crate::operator::{AssignOp, BinaryOp, CompareOp, UnaryOp};
use crate::span::Span;
use crate::template::Template;

/// A parsed program: the top-level statement sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    /// The top-level statements.
    pub body: Block,
}

/// An ordered list of statements.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    /// The statements, in source order.
    pub statements: Vec<StatementNode>,
    /// Source span.
    pub span: Span,
}

/// A statement.
#[derive(Clone, Debug, PartialEq)]
pub enum StatementNode {
    /// `x = e`, `x += e`, `lst[i] -= e`
    Assignment(Assignment),
    /// `a, b = e1, e2`
    MultiAssignment(MultiAssignment),
    /// `return [e]`
    Return(Option<ExpressionNode>, Span),
    /// `break`
    Break(Span),
    /// `continue`
    Continue(Span),
    /// `pass`
    Pass(Span),
    /// `if c: ... [else: ...]`
    If(Conditional),
    /// An `elif` link, nested as the else branch of its predecessor
    Elif(Conditional),
    /// `for x in e: ...`
    For(ForLoop),
    /// `while c: ...`
    While(WhileLoop),
    /// `def f(a, b): ...`
    FunctionDefinition(FunctionDefinition),
    /// An expression evaluated for its effect, usually a call
    Expression(ExpressionNode, Span),
    /// A nested statement sequence
    Block(Block),
}

/// Assignment target.
#[derive(Clone, Debug, PartialEq)]
pub enum AssignTarget {
    /// A plain variable.
    Name(String),
    /// An element of a list: `target[index]`.
    Index {
        /// The expression producing the list.
        target: Box<ExpressionNode>,
        /// The index expression.
        index: Box<ExpressionNode>,
        /// How the target is displayed, e.g. `grid[0]`.
        label: String,
    },
}

/// `target op value`
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    /// What is assigned to.
    pub target: AssignTarget,
    /// `=`, `+=` or `-=`.
    pub op: AssignOp,
    /// The assigned expression.
    pub value: ExpressionNode,
    /// Source span.
    pub span: Span,
}

/// `a, b = e1, e2`
#[derive(Clone, Debug, PartialEq)]
pub struct MultiAssignment {
    /// Target names, left to right.
    pub targets: Vec<String>,
    /// Value expressions, left to right.
    pub values: Vec<ExpressionNode>,
    /// Source span.
    pub span: Span,
}

/// An `if` or `elif` link.
#[derive(Clone, Debug, PartialEq)]
pub struct Conditional {
    /// The tested condition.
    pub condition: ExpressionNode,
    /// Statements run when the condition is truthy.
    pub then_branch: Block,
    /// A `Block` for `else`, or an `Elif` statement.
    pub else_branch: Option<Box<StatementNode>>,
    /// Source span.
    pub span: Span,
}

/// `for variable in iterable: body`
#[derive(Clone, Debug, PartialEq)]
pub struct ForLoop {
    /// The loop variable.
    pub variable: String,
    /// The iterated expression.
    pub iterable: ExpressionNode,
    /// The loop body.
    pub body: Block,
    /// Source span.
    pub span: Span,
}

/// `while condition: body`
#[derive(Clone, Debug, PartialEq)]
pub struct WhileLoop {
    /// The loop condition.
    pub condition: ExpressionNode,
    /// The loop body.
    pub body: Block,
    /// Source span.
    pub span: Span,
}

/// `def name(params): body`
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDefinition {
    /// The function's name.
    pub name: String,
    /// The formal parameters.
    pub params: FormalParams,
    /// The function body.
    pub body: Block,
    /// Source span.
    pub span: Span,
}

/// A call's argument list.
#[derive(Clone, Debug, PartialEq)]
pub struct ArgList {
    /// The argument expressions, in order.
    pub items: Vec<ExpressionNode>,
    /// Source span.
    pub span: Span,
}

/// A function's formal parameter list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormalParams {
    /// Parameter names, in order.
    pub names: Vec<String>,
    /// Source span.
    pub span: Span,
}

/// An expression.
#[derive(Clone, Debug, PartialEq)]
pub enum ExpressionNode {
    /// `42`
    Int(i64, Span),
    /// `2.5`
    Float(f64, Span),
    /// `"text"`
    String(String, Span),
    /// `True` / `False`
    Bool(bool, Span),
    /// `None`
    None(Span),
    /// `f"x = {x}"`
    FString(Template, Span),
    /// `name`
    Identifier(String, Span),
    /// `a if condition else b`
    Ternary {
        /// The tested condition.
        condition: Box<ExpressionNode>,
        /// Value when truthy.
        then_value: Box<ExpressionNode>,
        /// Value when falsy.
        else_value: Box<ExpressionNode>,
        /// Source span.
        span: Span,
    },
    /// A bare argument list
    Arguments(ArgList),
    /// `a < b`, `x in xs`
    Comparison {
        /// The operator.
        op: CompareOp,
        /// Left operand.
        left: Box<ExpressionNode>,
        /// Right operand.
        right: Box<ExpressionNode>,
        /// Source span.
        span: Span,
    },
    /// `a + b`, `a and b`
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<ExpressionNode>,
        /// Right operand.
        right: Box<ExpressionNode>,
        /// Source span.
        span: Span,
    },
    /// `-a`, `not a`
    Unary {
        /// The operator.
        op: UnaryOp,
        /// The operand.
        operand: Box<ExpressionNode>,
        /// Source span.
        span: Span,
    },
    /// `name(args)`
    Call {
        /// The called name.
        name: String,
        /// The arguments.
        args: ArgList,
        /// Source span.
        span: Span,
    },
    /// `target[index]`
    Index {
        /// The indexed expression.
        target: Box<ExpressionNode>,
        /// The index.
        index: Box<ExpressionNode>,
        /// Source span.
        span: Span,
    },
    /// `receiver.method(args)`
    MethodCall {
        /// The receiver.
        receiver: Box<ExpressionNode>,
        /// The method name.
        method: String,
        /// The arguments.
        args: ArgList,
        /// Source span.
        span: Span,
    },
    /// `target[start:stop:step]`
    Slice {
        /// The sliced expression.
        target: Box<ExpressionNode>,
        /// Optional start bound.
        start: Option<Box<ExpressionNode>>,
        /// Optional stop bound.
        stop: Option<Box<ExpressionNode>>,
        /// Optional step.
        step: Option<Box<ExpressionNode>>,
        /// Source span.
        span: Span,
    },
    /// `[a, b, c]`
    List(Vec<ExpressionNode>, Span),
    /// A bare formal-parameter list
    Parameters(FormalParams),
}

impl StatementNode {
    /// Returns the source span of this statement.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Assignment(node) => node.span,
            Self::MultiAssignment(node) => node.span,
            Self::Return(_, span)
            | Self::Break(span)
            | Self::Continue(span)
            | Self::Pass(span)
            | Self::Expression(_, span) => *span,
            Self::If(node) | Self::Elif(node) => node.span,
            Self::For(node) => node.span,
            Self::While(node) => node.span,
            Self::FunctionDefinition(node) => node.span,
            Self::Block(node) => node.span,
        }
    }
}

impl ExpressionNode {
    /// Returns the source span of this expression.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Int(_, span)
            | Self::Float(_, span)
            | Self::String(_, span)
            | Self::Bool(_, span)
            | Self::None(span)
            | Self::FString(_, span)
            | Self::Identifier(_, span)
            | Self::List(_, span)
            | Self::Ternary { span, .. }
            | Self::Comparison { span, .. }
            | Self::Binary { span, .. }
            | Self::Unary { span, .. }
            | Self::Call { span, .. }
            | Self::Index { span, .. }
            | Self::MethodCall { span, .. }
            | Self::Slice { span, .. } => *span,
            Self::Arguments(args) => args.span,
            Self::Parameters(params) => params.span,
        }
    }

    /// Returns the identifier name if this is an identifier reference.
    #[must_use]
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Self::Identifier(name, _) => Some(name),
            _ => None,
        }
    }
}
