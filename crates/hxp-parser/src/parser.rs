//! Recursive-descent parser producing an arena-allocated AST.
//!
//! Errors do not stop the parse. The first error in a statement is
//! recorded, the parser enters panic mode, and the statement list it is in
//! (top level or a block) skips ahead to the next statement boundary before
//! carrying on. Only one diagnostic is reported per desynchronization. If
//! anything was reported, `parse` returns every diagnostic and no program.

use std::fmt;

use thiserror::Error;

use crate::arena::Arena;
use crate::ast::*;
use crate::lexer::Lexer;
use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Deepest statement/expression nesting accepted before reporting an error.
pub const MAX_NESTING: u32 = 1024;

const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

/// Where a diagnostic points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorLocation {
    /// At a token, quoted in the message.
    At(String),
    /// At end of input.
    End,
    /// At a lexer error token; the message already says what is wrong.
    Lexical,
}

impl fmt::Display for ErrorLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorLocation::At(lexeme) => write!(f, " at '{lexeme}'"),
            ErrorLocation::End => f.write_str(" at end"),
            ErrorLocation::Lexical => Ok(()),
        }
    }
}

/// One syntax diagnostic.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("[line {line}:{column}] Error{location}: {message}")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
    pub line: u32,
    pub column: u32,
    pub location: ErrorLocation,
}

/// Every diagnostic from a failed parse, in source order. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseErrors {
    pub errors: Vec<ParseError>,
}

impl ParseErrors {
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParseError> {
        self.errors.iter()
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErrors {}

/// Parser for one source file. Consumed by [`Parser::parse`].
pub struct Parser<'a> {
    arena: &'a Arena,
    lexer: Lexer<'a>,
    source: &'a str,
    current: Token,
    previous: Token,
    errors: Vec<ParseError>,
    panic_mode: bool,
    /// Enclosing loops in the current function body.
    loop_depth: u32,
    block_depth: u32,
    /// Statements and expressions currently being parsed inside each other.
    nesting: u32,
}

impl<'a> Parser<'a> {
    /// Create a new parser over `source`, allocating into `arena`.
    pub fn new(arena: &'a Arena, source: &'a str) -> Self {
        let eof = Token::new(TokenKind::Eof, Span::default(), 1, 1);
        let mut parser = Self {
            arena,
            lexer: Lexer::new(source),
            source,
            current: eof.clone(),
            previous: eof,
            errors: Vec::new(),
            panic_mode: false,
            loop_depth: 0,
            block_depth: 0,
            nesting: 0,
        };
        parser.advance();
        parser
    }

    /// Parse the whole program.
    pub fn parse(mut self) -> Result<Program<'a>, ParseErrors> {
        let start = self.current.span.start;
        let mut stmts = self.arena.vec();

        while !self.is_eof() {
            if let Some(stmt) = self.declaration() {
                stmts.push(stmt);
            }
        }

        if !self.errors.is_empty() {
            return Err(ParseErrors {
                errors: self.errors,
            });
        }

        let end = self.current.span.end;
        Ok(Program::new(stmts.into_bump_slice(), Span::new(start, end)))
    }

    // =========================================================================
    // Token Handling
    // =========================================================================

    fn peek(&self) -> &TokenKind {
        &self.current.kind
    }

    fn is_eof(&self) -> bool {
        matches!(self.peek(), TokenKind::Eof)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(kind)
    }

    /// Move to the next token, reporting and skipping lexer error tokens.
    fn advance(&mut self) -> Token {
        loop {
            let next = self.lexer.next_token();
            if let TokenKind::Error(message) = &next.kind {
                let error = self.error_at(&next, message.clone());
                self.report(error);
                continue;
            }
            let current = std::mem::replace(&mut self.current, next);
            self.previous = current.clone();
            return current;
        }
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Result<Token, ParseError> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(self.error_at_current(message))
        }
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(&kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_identifier(&mut self, message: &str) -> Result<&'a str, ParseError> {
        match &self.current.kind {
            TokenKind::Identifier(name) => {
                let name = self.arena.alloc_str(name);
                self.advance();
                Ok(name)
            }
            _ => Err(self.error_at_current(message)),
        }
    }

    /// Identifiers and keywords are both valid after `.`.
    fn expect_property_name(&mut self) -> Result<&'a str, ParseError> {
        let name = match &self.current.kind {
            TokenKind::Identifier(name) => name.as_str(),
            kind if kind.is_keyword() => self.current.lexeme(self.source),
            _ => return Err(self.error_at_current("Expected property name after '.'")),
        };
        let name = self.arena.alloc_str(name);
        self.advance();
        Ok(name)
    }

    /// Span from `start` to the end of the last consumed token.
    fn span_from(&self, start: u32) -> Span {
        Span::new(start, self.previous.span.end.max(start))
    }

    // =========================================================================
    // Diagnostics and Recovery
    // =========================================================================

    fn error_at(&self, token: &Token, message: impl Into<String>) -> ParseError {
        let location = match &token.kind {
            TokenKind::Eof => ErrorLocation::End,
            TokenKind::Error(_) => ErrorLocation::Lexical,
            _ => ErrorLocation::At(token.lexeme(self.source).to_string()),
        };
        ParseError {
            message: message.into(),
            span: token.span,
            line: token.line,
            column: token.column,
            location,
        }
    }

    fn error_at_current(&self, message: impl Into<String>) -> ParseError {
        self.error_at(&self.current, message)
    }

    fn error_at_previous(&self, message: impl Into<String>) -> ParseError {
        self.error_at(&self.previous, message)
    }

    /// Record a diagnostic unless one is already pending for this statement.
    fn report(&mut self, error: ParseError) {
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;
        self.errors.push(error);
    }

    /// Parse one statement of a statement list, recovering from errors.
    fn declaration(&mut self) -> Option<Stmt<'a>> {
        let start = self.current.span.start;
        match self.parse_statement() {
            Ok(stmt) if !self.panic_mode => Some(stmt),
            Ok(_) => {
                self.synchronize(start);
                None
            }
            Err(error) => {
                self.report(error);
                self.synchronize(start);
                None
            }
        }
    }

    /// Skip to the next statement boundary: just after a `;`, or before a
    /// statement keyword. Inside a block, also stop before `}`. Always
    /// consumes at least one token if the failed statement consumed none.
    ///
    /// Panic mode stays on while skipping, so lexer errors inside the
    /// skipped tokens do not add diagnostics.
    fn synchronize(&mut self, stmt_start: u32) {
        if self.current.span.start == stmt_start && !self.is_eof() {
            self.advance();
        }

        while !self.is_eof() {
            if matches!(self.previous.kind, TokenKind::Semicolon)
                || self.peek().starts_statement()
                || (self.block_depth > 0 && matches!(self.peek(), TokenKind::RBrace))
            {
                break;
            }
            self.advance();
        }

        self.panic_mode = false;
    }

    /// Run `f` one nesting level deeper, growing the stack when it runs low.
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.nesting >= MAX_NESTING {
            return Err(self.error_at_current("Nesting too deep"));
        }
        self.nesting += 1;
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || f(self));
        self.nesting -= 1;
        result
    }

    // =========================================================================
    // Statement Parsing
    // =========================================================================

    fn parse_statement(&mut self) -> Result<Stmt<'a>, ParseError> {
        self.nested(Self::parse_statement_inner)
    }

    fn parse_statement_inner(&mut self) -> Result<Stmt<'a>, ParseError> {
        let start = self.current.span.start;

        let kind = match self.peek() {
            TokenKind::Let | TokenKind::Const => self.parse_var_decl()?,
            TokenKind::Fn if matches!(self.lexer.peek().kind, TokenKind::Identifier(_)) => {
                self.parse_function_decl()?
            }
            TokenKind::If => self.parse_if()?,
            TokenKind::While => self.parse_while()?,
            TokenKind::For => self.parse_for()?,
            TokenKind::Return => self.parse_return()?,
            TokenKind::Break => self.parse_loop_jump(StmtKind::Break, "break")?,
            TokenKind::Continue => self.parse_loop_jump(StmtKind::Continue, "continue")?,
            TokenKind::LBrace => {
                self.advance();
                StmtKind::Block(self.parse_block_body()?)
            }
            TokenKind::Semicolon => {
                self.advance();
                StmtKind::Empty
            }
            _ => {
                let expr = self.parse_expression()?;
                self.expect(TokenKind::Semicolon, "Expected ';' after expression")?;
                StmtKind::Expr(expr)
            }
        };

        Ok(Stmt::new(kind, self.span_from(start)))
    }

    fn parse_var_decl(&mut self) -> Result<StmtKind<'a>, ParseError> {
        let kind = match self.advance().kind {
            TokenKind::Const => VarKind::Const,
            _ => VarKind::Let,
        };

        let name = self.expect_identifier("Expected variable name")?;
        let ty = if self.eat(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let init = if self.eat(TokenKind::Eq) {
            Some(self.parse_expression()?)
        } else {
            None
        };

        self.expect(TokenKind::Semicolon, "Expected ';' after variable declaration")?;
        Ok(StmtKind::Var {
            kind,
            name,
            ty,
            init,
        })
    }

    /// `name`, `name[]`, `name?`, and combinations.
    fn parse_type(&mut self) -> Result<&'a Type<'a>, ParseError> {
        let name = match &self.current.kind {
            TokenKind::Identifier(name) => self.arena.alloc_str(name),
            TokenKind::Null => "null",
            TokenKind::Fn => "fn",
            _ => return Err(self.error_at_current("Expected type name")),
        };
        self.advance();

        let mut ty = Type {
            name,
            is_array: false,
            is_optional: false,
            element: None,
        };
        while self.eat(TokenKind::LBracket) {
            self.expect(TokenKind::RBracket, "Expected ']' in array type")?;
            ty = Type {
                name,
                is_array: true,
                is_optional: false,
                element: Some(self.arena.alloc(ty)),
            };
        }
        if self.eat(TokenKind::Question) {
            ty.is_optional = true;
        }

        Ok(self.arena.alloc(ty))
    }

    fn parse_function_decl(&mut self) -> Result<StmtKind<'a>, ParseError> {
        let start = self.advance().span.start; // fn
        let name = self.expect_identifier("Expected function name")?;
        self.expect(TokenKind::LParen, "Expected '(' after function name")?;
        let func = self.parse_function_rest(Some(name), start)?;
        Ok(StmtKind::Function(func))
    }

    /// Everything after the opening `(` of a parameter list.
    fn parse_function_rest(
        &mut self,
        name: Option<&'a str>,
        start: u32,
    ) -> Result<&'a Function<'a>, ParseError> {
        let params = self.parse_params()?;
        self.expect(TokenKind::RParen, "Expected ')' after parameters")?;

        let return_type = if self.eat(TokenKind::Arrow) {
            Some(self.parse_type()?)
        } else {
            None
        };

        self.expect(TokenKind::LBrace, "Expected '{' before function body")?;

        // break/continue never cross a function boundary.
        let outer_loops = std::mem::replace(&mut self.loop_depth, 0);
        let body = self.parse_block_body();
        self.loop_depth = outer_loops;

        Ok(self.arena.alloc(Function {
            name,
            params,
            return_type,
            body: body?,
            span: self.span_from(start),
        }))
    }

    fn parse_params(&mut self) -> Result<&'a [Param<'a>], ParseError> {
        let mut params = self.arena.vec();

        if !self.check(&TokenKind::RParen) {
            loop {
                let start = self.current.span.start;
                let name = self.expect_identifier("Expected parameter name")?;
                let ty = if self.eat(TokenKind::Colon) {
                    Some(self.parse_type()?)
                } else {
                    None
                };
                let default = if self.eat(TokenKind::Eq) {
                    Some(self.parse_expression()?)
                } else {
                    None
                };
                params.push(Param {
                    name,
                    ty,
                    default,
                    span: self.span_from(start),
                });

                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }

        Ok(params.into_bump_slice())
    }

    /// Statements up to and including the closing `}`. The `{` is already consumed.
    fn parse_block_body(&mut self) -> Result<&'a [Stmt<'a>], ParseError> {
        self.block_depth += 1;
        let mut stmts = self.arena.vec();

        while !matches!(self.peek(), TokenKind::RBrace | TokenKind::Eof) {
            if let Some(stmt) = self.declaration() {
                stmts.push(stmt);
            }
        }

        self.block_depth -= 1;
        self.expect(TokenKind::RBrace, "Expected '}' after block")?;
        Ok(stmts.into_bump_slice())
    }

    fn parse_if(&mut self) -> Result<StmtKind<'a>, ParseError> {
        self.advance(); // if
        self.expect(TokenKind::LParen, "Expected '(' after 'if'")?;
        let test = self.parse_expression()?;
        self.expect(TokenKind::RParen, "Expected ')' after if condition")?;

        let consequent = self.parse_statement()?;
        let consequent = self.arena.alloc(consequent);
        let alternate = if self.eat(TokenKind::Else) {
            let alternate = self.parse_statement()?;
            Some(self.arena.alloc(alternate))
        } else {
            None
        };

        Ok(StmtKind::If {
            test,
            consequent,
            alternate,
        })
    }

    fn parse_while(&mut self) -> Result<StmtKind<'a>, ParseError> {
        self.advance(); // while
        self.expect(TokenKind::LParen, "Expected '(' after 'while'")?;
        let test = self.parse_expression()?;
        self.expect(TokenKind::RParen, "Expected ')' after while condition")?;

        let body = self.parse_loop_body()?;
        Ok(StmtKind::While { test, body })
    }

    fn parse_for(&mut self) -> Result<StmtKind<'a>, ParseError> {
        self.advance(); // for
        self.expect(TokenKind::LParen, "Expected '(' after 'for'")?;
        let binding = self.expect_identifier("Expected loop variable name")?;
        self.expect(TokenKind::In, "Expected 'in' after loop variable")?;
        let iterable = self.parse_expression()?;
        self.expect(TokenKind::RParen, "Expected ')' after for clause")?;

        let body = self.parse_loop_body()?;
        Ok(StmtKind::For {
            binding,
            iterable,
            body,
        })
    }

    fn parse_loop_body(&mut self) -> Result<&'a Stmt<'a>, ParseError> {
        self.loop_depth += 1;
        let body = self.parse_statement();
        self.loop_depth -= 1;
        Ok(self.arena.alloc(body?))
    }

    fn parse_return(&mut self) -> Result<StmtKind<'a>, ParseError> {
        self.advance(); // return
        let arg = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::Semicolon, "Expected ';' after return value")?;
        Ok(StmtKind::Return(arg))
    }

    /// `break;` / `continue;`
    fn parse_loop_jump(
        &mut self,
        kind: StmtKind<'a>,
        keyword: &str,
    ) -> Result<StmtKind<'a>, ParseError> {
        self.advance();
        if self.loop_depth == 0 {
            return Err(self.error_at_previous(format!("'{keyword}' outside of a loop")));
        }
        self.expect(
            TokenKind::Semicolon,
            &format!("Expected ';' after '{keyword}'"),
        )?;
        Ok(kind)
    }

    // =========================================================================
    // Expression Parsing
    // =========================================================================

    fn parse_expression(&mut self) -> Result<Expr<'a>, ParseError> {
        self.nested(Self::parse_assignment)
    }

    fn parse_assignment(&mut self) -> Result<Expr<'a>, ParseError> {
        let target = self.parse_conditional()?;

        if let Some(op) = self.assignment_op() {
            let op_token = self.advance();
            let value = self.parse_expression()?;
            if !target.kind.is_assign_target() {
                return Err(self.error_at(&op_token, "Invalid assignment target"));
            }
            let span = Span::new(target.span.start, value.span.end);
            return Ok(Expr::new(
                ExprKind::Assign {
                    op,
                    target: self.arena.alloc(target),
                    value: self.arena.alloc(value),
                },
                span,
            ));
        }

        Ok(target)
    }

    fn assignment_op(&self) -> Option<AssignOp> {
        match self.peek() {
            TokenKind::Eq => Some(AssignOp::Assign),
            TokenKind::PlusEq => Some(AssignOp::AddAssign),
            TokenKind::MinusEq => Some(AssignOp::SubAssign),
            TokenKind::StarEq => Some(AssignOp::MulAssign),
            TokenKind::SlashEq => Some(AssignOp::DivAssign),
            TokenKind::PercentEq => Some(AssignOp::ModAssign),
            _ => None,
        }
    }

    fn parse_conditional(&mut self) -> Result<Expr<'a>, ParseError> {
        let test = self.parse_binary(0)?;

        if self.eat(TokenKind::Question) {
            let consequent = self.parse_expression()?;
            self.expect(TokenKind::Colon, "Expected ':' in conditional expression")?;
            let alternate = self.parse_expression()?;
            let span = Span::new(test.span.start, alternate.span.end);
            return Ok(Expr::new(
                ExprKind::Conditional {
                    test: self.arena.alloc(test),
                    consequent: self.arena.alloc(consequent),
                    alternate: self.arena.alloc(alternate),
                },
                span,
            ));
        }

        Ok(test)
    }

    /// Left-associative binary operators by precedence climbing.
    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr<'a>, ParseError> {
        let mut left = self.parse_unary()?;

        while let Some((op, prec)) = self.binary_op() {
            if prec < min_prec {
                break;
            }

            self.advance();
            let right = self.parse_binary(prec + 1)?;
            let span = Span::new(left.span.start, right.span.end);
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: self.arena.alloc(left),
                    right: self.arena.alloc(right),
                },
                span,
            );
        }

        Ok(left)
    }

    fn binary_op(&self) -> Option<(BinaryOp, u8)> {
        match self.peek() {
            TokenKind::PipePipe => Some((BinaryOp::Or, 1)),
            TokenKind::AmpAmp => Some((BinaryOp::And, 2)),
            TokenKind::EqEq => Some((BinaryOp::Eq, 3)),
            TokenKind::BangEq => Some((BinaryOp::NotEq, 3)),
            TokenKind::Lt => Some((BinaryOp::Lt, 4)),
            TokenKind::LtEq => Some((BinaryOp::LtEq, 4)),
            TokenKind::Gt => Some((BinaryOp::Gt, 4)),
            TokenKind::GtEq => Some((BinaryOp::GtEq, 4)),
            TokenKind::Plus => Some((BinaryOp::Add, 5)),
            TokenKind::Minus => Some((BinaryOp::Sub, 5)),
            TokenKind::Star => Some((BinaryOp::Mul, 6)),
            TokenKind::Slash => Some((BinaryOp::Div, 6)),
            TokenKind::Percent => Some((BinaryOp::Mod, 6)),
            _ => None,
        }
    }

    fn parse_unary(&mut self) -> Result<Expr<'a>, ParseError> {
        let start = self.current.span.start;

        let op = match self.peek() {
            TokenKind::Minus => Some(UnaryOp::Minus),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            _ => None,
        };

        if let Some(op) = op {
            self.advance();
            let arg = self.nested(Self::parse_unary)?;
            let span = Span::new(start, arg.span.end);
            return Ok(Expr::new(
                ExprKind::Unary {
                    op,
                    arg: self.arena.alloc(arg),
                },
                span,
            ));
        }

        // Prefix update: ++x, --x
        if matches!(self.peek(), TokenKind::PlusPlus | TokenKind::MinusMinus) {
            let op_token = self.advance();
            let op = if matches!(op_token.kind, TokenKind::PlusPlus) {
                UpdateOp::Increment
            } else {
                UpdateOp::Decrement
            };
            let arg = self.nested(Self::parse_unary)?;
            if !arg.kind.is_assign_target() {
                return Err(self.error_at(&op_token, "Invalid increment/decrement target"));
            }
            let span = Span::new(start, arg.span.end);
            return Ok(Expr::new(
                ExprKind::Update {
                    op,
                    arg: self.arena.alloc(arg),
                },
                span,
            ));
        }

        self.parse_postfix()
    }

    /// Calls, `.member` and `[index]`, left to right.
    fn parse_postfix(&mut self) -> Result<Expr<'a>, ParseError> {
        let mut expr = self.parse_primary()?;
        let start = expr.span.start;

        loop {
            let kind = match self.peek() {
                TokenKind::LParen => {
                    self.advance();
                    let args = self.parse_arguments()?;
                    self.expect(TokenKind::RParen, "Expected ')' after arguments")?;
                    ExprKind::Call {
                        callee: self.arena.alloc(expr),
                        args,
                    }
                }
                TokenKind::Dot => {
                    self.advance();
                    let property = self.expect_property_name()?;
                    ExprKind::Member {
                        object: self.arena.alloc(expr),
                        property,
                    }
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expression()?;
                    self.expect(TokenKind::RBracket, "Expected ']' after index")?;
                    ExprKind::Index {
                        object: self.arena.alloc(expr),
                        index: self.arena.alloc(index),
                    }
                }
                _ => break,
            };
            expr = Expr::new(kind, self.span_from(start));
        }

        Ok(expr)
    }

    fn parse_arguments(&mut self) -> Result<&'a [Expr<'a>], ParseError> {
        let mut args = self.arena.vec();

        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }

        Ok(args.into_bump_slice())
    }

    fn parse_primary(&mut self) -> Result<Expr<'a>, ParseError> {
        let start = self.current.span.start;

        let kind = match &self.current.kind {
            TokenKind::Number(n) => {
                let n = *n;
                self.advance();
                ExprKind::Number(n)
            }
            TokenKind::String(s) => {
                let s = self.arena.alloc_str(s);
                self.advance();
                ExprKind::String(s)
            }
            TokenKind::Identifier(name) => {
                let name = self.arena.alloc_str(name);
                self.advance();
                ExprKind::Ident(name)
            }
            TokenKind::True => {
                self.advance();
                ExprKind::Bool(true)
            }
            TokenKind::False => {
                self.advance();
                ExprKind::Bool(false)
            }
            TokenKind::Null => {
                self.advance();
                ExprKind::Null
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen, "Expected ')' after expression")?;
                return Ok(expr);
            }
            TokenKind::LBracket => self.parse_array()?,
            TokenKind::LBrace => self.parse_object()?,
            TokenKind::Fn => {
                self.advance();
                self.expect(TokenKind::LParen, "Expected '(' after 'fn'")?;
                ExprKind::Lambda(self.parse_function_rest(None, start)?)
            }
            kind if kind.is_reserved() => {
                let word = self.current.lexeme(self.source);
                return Err(self.error_at_current(format!("'{word}' is not supported")));
            }
            kind if kind.is_jsx() => {
                return Err(self.error_at_current("JSX elements are not supported"));
            }
            _ => return Err(self.error_at_current("Expected expression")),
        };

        Ok(Expr::new(kind, self.span_from(start)))
    }

    fn parse_array(&mut self) -> Result<ExprKind<'a>, ParseError> {
        self.advance(); // [
        let mut elements = self.arena.vec();

        while !self.check(&TokenKind::RBracket) {
            elements.push(self.parse_expression()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::RBracket, "Expected ']' after array elements")?;
        Ok(ExprKind::Array(elements.into_bump_slice()))
    }

    fn parse_object(&mut self) -> Result<ExprKind<'a>, ParseError> {
        self.advance(); // {
        let mut props = self.arena.vec();

        while !self.check(&TokenKind::RBrace) {
            let start = self.current.span.start;
            let key = match &self.current.kind {
                TokenKind::Identifier(s) | TokenKind::String(s) => self.arena.alloc_str(s),
                _ => return Err(self.error_at_current("Expected property name")),
            };
            self.advance();
            self.expect(TokenKind::Colon, "Expected ':' after property name")?;
            let value = self.parse_expression()?;
            props.push(Property {
                key,
                value,
                span: self.span_from(start),
            });

            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::RBrace, "Expected '}' after object properties")?;
        Ok(ExprKind::Object(props.into_bump_slice()))
    }
}
