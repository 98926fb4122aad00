//! Parser for the Rewind language.
//!
//! A recursive-descent parser over the token stream, producing the
//! [`Program`] tree the compiler consumes. Precedence, loosest first:
//! ternary, `or`, `and`, `not`, comparisons, `+ -`, `* / // %`, unary
//! `- + !`, `**`, then calls, indexing, slicing, and method calls.

use rewind_foundation::{Error, ErrorKind, Result};

use crate::ast::{
    ArgList, AssignTarget, Assignment, Block, Conditional, ExpressionNode, ForLoop, FormalParams,
    FunctionDefinition, MultiAssignment, Program, StatementNode, WhileLoop,
};
use crate::lexer::Lexer;
use crate::operator::{AssignOp, BinaryOp, CompareOp, UnaryOp};
use crate::span::Span;
use crate::template::Template;
use crate::token::{Token, TokenKind};

/// Parses a whole program.
///
/// # Errors
/// Returns a parse failure describing the first offending token.
pub fn parse(source: &str) -> Result<Program> {
    Parser::new(source).parse_program()
}

/// Parses a single expression, such as an f-string segment.
///
/// # Errors
/// Returns a parse failure if the text is not exactly one expression.
pub fn parse_expression(source: &str) -> Result<ExpressionNode> {
    let mut parser = Parser::new(source);
    let expression = parser.parse_expression()?;
    parser.eat(&TokenKind::Newline);
    parser.expect(&TokenKind::Eof)?;
    Ok(expression)
}

/// Parser for Rewind source code.
pub struct Parser<'src> {
    /// The lexer providing tokens.
    lexer: Lexer<'src>,
    /// Current token (lookahead).
    current: Token,
    /// Span of the most recently consumed token.
    previous: Span,
    /// Source text (for error messages and labels).
    source: &'src str,
}

impl<'src> Parser<'src> {
    /// Creates a new parser for the given source.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            previous: Span::at_start(),
            source,
        }
    }

    /// Parses statements until end of input.
    ///
    /// # Errors
    /// Returns an error if the source cannot be parsed.
    pub fn parse_program(&mut self) -> Result<Program> {
        let mut statements = Vec::new();
        while !self.check(&TokenKind::Eof) {
            statements.push(self.parse_statement()?);
        }
        Ok(Program {
            body: block(statements),
        })
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_statement(&mut self) -> Result<StatementNode> {
        match self.current.kind {
            TokenKind::If => Ok(StatementNode::If(self.parse_conditional()?)),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Def => self.parse_def(),
            _ => {
                let statement = self.parse_simple()?;
                self.end_line()?;
                Ok(statement)
            }
        }
    }

    fn end_line(&mut self) -> Result<()> {
        if self.eat(&TokenKind::Newline) || self.check(&TokenKind::Eof) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn parse_simple(&mut self) -> Result<StatementNode> {
        let start = self.current.span;
        match self.current.kind {
            TokenKind::Pass => {
                self.advance();
                return Ok(StatementNode::Pass(start));
            }
            TokenKind::Break => {
                self.advance();
                return Ok(StatementNode::Break(start));
            }
            TokenKind::Continue => {
                self.advance();
                return Ok(StatementNode::Continue(start));
            }
            TokenKind::Return => {
                self.advance();
                let value = if matches!(self.current.kind, TokenKind::Newline | TokenKind::Eof) {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                return Ok(StatementNode::Return(value, start.to(self.previous)));
            }
            _ => {}
        }

        let first = self.parse_expression()?;

        if self.check(&TokenKind::Comma) {
            let mut targets = vec![first];
            while self.eat(&TokenKind::Comma) {
                targets.push(self.parse_expression()?);
            }
            self.expect(&TokenKind::Assign)?;
            let mut values = vec![self.parse_expression()?];
            while self.eat(&TokenKind::Comma) {
                values.push(self.parse_expression()?);
            }
            let targets = targets
                .into_iter()
                .map(|target| match target {
                    ExpressionNode::Identifier(name, _) => Ok(name),
                    other => Err(cannot_assign(&other)),
                })
                .collect::<Result<Vec<_>>>()?;
            return Ok(StatementNode::MultiAssignment(MultiAssignment {
                targets,
                values,
                span: start.to(self.previous),
            }));
        }

        let op = match self.current.kind {
            TokenKind::Assign => AssignOp::Set,
            TokenKind::PlusAssign => AssignOp::Add,
            TokenKind::MinusAssign => AssignOp::Sub,
            _ => return Ok(StatementNode::Expression(first, start.to(self.previous))),
        };
        self.advance();
        let value = self.parse_expression()?;
        let target = match first {
            ExpressionNode::Identifier(name, _) => AssignTarget::Name(name),
            ExpressionNode::Index { target, index, .. } => {
                let label = target.span().text(self.source).to_string();
                AssignTarget::Index {
                    target,
                    index,
                    label,
                }
            }
            other => return Err(cannot_assign(&other)),
        };
        Ok(StatementNode::Assignment(Assignment {
            target,
            op,
            value,
            span: start.to(self.previous),
        }))
    }

    /// Parses `if`/`elif` with everything chained after it.
    fn parse_conditional(&mut self) -> Result<Conditional> {
        let start = self.current.span;
        self.advance(); // `if` or `elif`
        let condition = self.parse_expression()?;
        let then_branch = self.parse_block()?;
        let else_branch = match self.current.kind {
            TokenKind::Elif => Some(Box::new(StatementNode::Elif(self.parse_conditional()?))),
            TokenKind::Else => {
                self.advance();
                Some(Box::new(StatementNode::Block(self.parse_block()?)))
            }
            _ => None,
        };
        let end = else_branch
            .as_ref()
            .map_or(then_branch.span, |branch| branch.span());
        Ok(Conditional {
            condition,
            then_branch,
            else_branch,
            span: start.to(end),
        })
    }

    fn parse_while(&mut self) -> Result<StatementNode> {
        let start = self.current.span;
        self.advance();
        let condition = self.parse_expression()?;
        let body = self.parse_block()?;
        let span = start.to(body.span);
        Ok(StatementNode::While(WhileLoop {
            condition,
            body,
            span,
        }))
    }

    fn parse_for(&mut self) -> Result<StatementNode> {
        let start = self.current.span;
        self.advance();
        let variable = self.expect_identifier()?;
        self.expect(&TokenKind::In)?;
        let iterable = self.parse_expression()?;
        let body = self.parse_block()?;
        let span = start.to(body.span);
        Ok(StatementNode::For(ForLoop {
            variable,
            iterable,
            body,
            span,
        }))
    }

    fn parse_def(&mut self) -> Result<StatementNode> {
        let start = self.current.span;
        self.advance();
        let name = self.expect_identifier()?;
        let open = self.expect(&TokenKind::LParen)?.span;
        let mut names: Vec<String> = Vec::new();
        while !self.check(&TokenKind::RParen) {
            let param_span = self.current.span;
            let param = self.expect_identifier()?;
            if names.contains(&param) {
                return Err(Error::parse(
                    format!("duplicate argument '{param}' in function definition"),
                    param_span.line,
                    param_span.column,
                ));
            }
            names.push(param);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        let close = self.expect(&TokenKind::RParen)?.span;
        let params = FormalParams {
            names,
            span: open.to(close),
        };
        let body = self.parse_block()?;
        let span = start.to(body.span);
        Ok(StatementNode::FunctionDefinition(FunctionDefinition {
            name,
            params,
            body,
            span,
        }))
    }

    /// Parses `: suite`, either inline or as an indented block.
    fn parse_block(&mut self) -> Result<Block> {
        self.expect(&TokenKind::Colon)?;
        let mut statements = Vec::new();
        if self.eat(&TokenKind::Newline) {
            self.expect(&TokenKind::Indent)?;
            while !matches!(self.current.kind, TokenKind::Dedent | TokenKind::Eof) {
                statements.push(self.parse_statement()?);
            }
            self.eat(&TokenKind::Dedent);
        } else {
            statements.push(self.parse_simple()?);
            self.end_line()?;
        }
        Ok(block(statements))
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// Parses an expression.
    ///
    /// # Errors
    /// Returns an error if the tokens do not form an expression.
    pub fn parse_expression(&mut self) -> Result<ExpressionNode> {
        let value = self.parse_or()?;
        if !self.eat(&TokenKind::If) {
            return Ok(value);
        }
        let condition = self.parse_or()?;
        self.expect(&TokenKind::Else)?;
        let else_value = self.parse_expression()?;
        let span = value.span().to(else_value.span());
        Ok(ExpressionNode::Ternary {
            condition: Box::new(condition),
            then_value: Box::new(value),
            else_value: Box::new(else_value),
            span,
        })
    }

    fn parse_or(&mut self) -> Result<ExpressionNode> {
        let mut left = self.parse_and()?;
        while self.eat(&TokenKind::Or) {
            let right = self.parse_and()?;
            left = binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<ExpressionNode> {
        let mut left = self.parse_not()?;
        while self.eat(&TokenKind::And) {
            let right = self.parse_not()?;
            left = binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<ExpressionNode> {
        if !self.check(&TokenKind::Not) {
            return self.parse_comparison();
        }
        let start = self.current.span;
        self.advance();
        let operand = self.parse_not()?;
        Ok(unary(UnaryOp::Not, start, operand))
    }

    /// Parses a comparison; chains like `a < b < c` become `a < b and b < c`.
    fn parse_comparison(&mut self) -> Result<ExpressionNode> {
        let first = self.parse_sum()?;
        let mut operands = vec![first];
        let mut ops = Vec::new();
        loop {
            let op = match self.current.kind {
                TokenKind::Lt => (CompareOp::Lt, false),
                TokenKind::Gt => (CompareOp::Gt, false),
                TokenKind::LtEq => (CompareOp::LtEq, false),
                TokenKind::GtEq => (CompareOp::GtEq, false),
                TokenKind::EqEq => (CompareOp::Eq, false),
                TokenKind::NotEq => (CompareOp::NotEq, false),
                TokenKind::In => (CompareOp::In, false),
                TokenKind::Not => {
                    self.advance();
                    if !self.check(&TokenKind::In) {
                        return Err(self.unexpected());
                    }
                    (CompareOp::In, true)
                }
                _ => break,
            };
            self.advance();
            ops.push(op);
            operands.push(self.parse_sum()?);
        }

        let mut links = Vec::with_capacity(ops.len());
        for (i, (op, negated)) in ops.into_iter().enumerate() {
            let left = operands[i].clone();
            let right = operands[i + 1].clone();
            let span = left.span().to(right.span());
            let comparison = ExpressionNode::Comparison {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
            links.push(if negated {
                ExpressionNode::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(comparison),
                    span,
                }
            } else {
                comparison
            });
        }
        let mut links = links.into_iter();
        let Some(mut result) = links.next() else {
            return Ok(operands.swap_remove(0));
        };
        for link in links {
            result = binary(BinaryOp::And, result, link);
        }
        Ok(result)
    }

    fn parse_sum(&mut self) -> Result<ExpressionNode> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_term()?;
            left = binary(op, left, right);
        }
    }

    fn parse_term(&mut self) -> Result<ExpressionNode> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::SlashSlash => BinaryOp::FloorDiv,
                TokenKind::Percent => BinaryOp::Mod,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_factor()?;
            left = binary(op, left, right);
        }
    }

    fn parse_factor(&mut self) -> Result<ExpressionNode> {
        let op = match self.current.kind {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Pos,
            TokenKind::Bang => UnaryOp::Bang,
            _ => return self.parse_power(),
        };
        let start = self.current.span;
        self.advance();
        let operand = self.parse_factor()?;
        Ok(unary(op, start, operand))
    }

    fn parse_power(&mut self) -> Result<ExpressionNode> {
        let base = self.parse_postfix()?;
        if !self.eat(&TokenKind::StarStar) {
            return Ok(base);
        }
        let exponent = self.parse_factor()?;
        Ok(binary(BinaryOp::Pow, base, exponent))
    }

    fn parse_postfix(&mut self) -> Result<ExpressionNode> {
        let mut expr = self.parse_atom()?;
        loop {
            match self.current.kind {
                TokenKind::LParen => {
                    let ExpressionNode::Identifier(name, start) = expr else {
                        return Err(Error::parse(
                            "only named functions can be called",
                            self.current.span.line,
                            self.current.span.column,
                        ));
                    };
                    let args = self.parse_args()?;
                    let span = start.to(args.span);
                    expr = ExpressionNode::Call { name, args, span };
                }
                TokenKind::LBracket => {
                    self.advance();
                    expr = self.parse_subscript(expr)?;
                }
                TokenKind::Dot => {
                    self.advance();
                    let method = self.expect_identifier()?;
                    if !self.check(&TokenKind::LParen) {
                        return Err(self.unexpected());
                    }
                    let args = self.parse_args()?;
                    let span = expr.span().to(args.span);
                    expr = ExpressionNode::MethodCall {
                        receiver: Box::new(expr),
                        method,
                        args,
                        span,
                    };
                }
                _ => return Ok(expr),
            }
        }
    }

    /// Parses what follows `[`: an index or a slice.
    fn parse_subscript(&mut self, target: ExpressionNode) -> Result<ExpressionNode> {
        let start = if self.check(&TokenKind::Colon) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };

        if !self.eat(&TokenKind::Colon) {
            let close = self.expect(&TokenKind::RBracket)?.span;
            let Some(index) = start else {
                return Err(self.unexpected());
            };
            let span = target.span().to(close);
            return Ok(ExpressionNode::Index {
                target: Box::new(target),
                index,
                span,
            });
        }

        let stop = if matches!(self.current.kind, TokenKind::Colon | TokenKind::RBracket) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        let step = if self.eat(&TokenKind::Colon) && !self.check(&TokenKind::RBracket) {
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };
        let close = self.expect(&TokenKind::RBracket)?.span;
        let span = target.span().to(close);
        Ok(ExpressionNode::Slice {
            target: Box::new(target),
            start,
            stop,
            step,
            span,
        })
    }

    fn parse_args(&mut self) -> Result<ArgList> {
        let open = self.expect(&TokenKind::LParen)?.span;
        let mut items = Vec::new();
        while !self.check(&TokenKind::RParen) {
            items.push(self.parse_expression()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        let close = self.expect(&TokenKind::RParen)?.span;
        Ok(ArgList {
            items,
            span: open.to(close),
        })
    }

    fn parse_atom(&mut self) -> Result<ExpressionNode> {
        let span = self.current.span;
        let node = match &self.current.kind {
            TokenKind::Int(n) => ExpressionNode::Int(*n, span),
            TokenKind::Float(n) => ExpressionNode::Float(*n, span),
            TokenKind::String(s) => ExpressionNode::String(s.clone(), span),
            TokenKind::True => ExpressionNode::Bool(true, span),
            TokenKind::False => ExpressionNode::Bool(false, span),
            TokenKind::None => ExpressionNode::None(span),
            TokenKind::Identifier(name) => ExpressionNode::Identifier(name.clone(), span),
            TokenKind::FString(raw) => ExpressionNode::FString(template(raw, span)?, span),
            TokenKind::LBracket => return self.parse_list(),
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(&TokenKind::RParen)?;
                return Ok(inner);
            }
            _ => return Err(self.unexpected()),
        };
        self.advance();
        Ok(node)
    }

    fn parse_list(&mut self) -> Result<ExpressionNode> {
        let open = self.expect(&TokenKind::LBracket)?.span;
        let mut items = Vec::new();
        while !self.check(&TokenKind::RBracket) {
            items.push(self.parse_expression()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        let close = self.expect(&TokenKind::RBracket)?.span;
        Ok(ExpressionNode::List(items, open.to(close)))
    }

    // =========================================================================
    // Token helpers
    // =========================================================================

    fn advance(&mut self) -> Token {
        let next = self.lexer.next_token();
        let token = std::mem::replace(&mut self.current, next);
        self.previous = token.span;
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.current.kind == kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected())
        }
    }

    fn expect_identifier(&mut self) -> Result<String> {
        if let TokenKind::Identifier(name) = &self.current.kind {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.unexpected())
        }
    }

    /// Builds the error for the current token.
    fn unexpected(&self) -> Error {
        let span = self.current.span;
        let message = match &self.current.kind {
            TokenKind::Error(message) => message.clone(),
            kind => match kind.layout_name() {
                Some(name) => format!("Unexpected {name}"),
                None => format!("Unexpected token \"{}\"", self.current.text(self.source)),
            },
        };
        Error::parse(message, span.line, span.column)
    }
}

fn block(statements: Vec<StatementNode>) -> Block {
    let span = match (statements.first(), statements.last()) {
        (Some(first), Some(last)) => first.span().to(last.span()),
        _ => Span::at_start(),
    };
    Block { statements, span }
}

fn binary(op: BinaryOp, left: ExpressionNode, right: ExpressionNode) -> ExpressionNode {
    let span = left.span().to(right.span());
    ExpressionNode::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
        span,
    }
}

fn unary(op: UnaryOp, start: Span, operand: ExpressionNode) -> ExpressionNode {
    let span = start.to(operand.span());
    ExpressionNode::Unary {
        op,
        operand: Box::new(operand),
        span,
    }
}

fn cannot_assign(target: &ExpressionNode) -> Error {
    let span = target.span();
    Error::parse("cannot assign to expression", span.line, span.column)
}

/// Splits an f-string and checks every embedded expression parses.
fn template(raw: &str, span: Span) -> Result<Template> {
    let template = Template::parse(raw).map_err(|m| Error::parse(m, span.line, span.column))?;
    for text in template.expressions() {
        if let Err(error) = parse_expression(text) {
            let detail = match error.kind {
                ErrorKind::ParseFailure { message, .. } => message,
                other => other.to_string(),
            };
            return Err(Error::parse(
                format!("f-string: {detail}"),
                span.line,
                span.column,
            ));
        }
    }
    Ok(template)
}
