//! Expression parsing.
//!
//! Precedence, loosest first: lambda, conditional, `or`, `and`, `not`,
//! comparison chains, `|`, `^`, `&`, shifts, `+ -`, `* / // %`, unary
//! `+ - ~`, `**`, then postfix calls, subscripts and attributes.
//!
//! - `mod.rs`: entry points and the operator precedence chain
//! - `operators.rs`: operator matching helpers
//! - `primary.rs`: literals, names, displays and comprehensions
//! - `postfix.rs`: calls, subscripts and attribute access

mod operators;
mod postfix;
mod primary;

use slate_ir::{BinaryOp, BoolOp, CmpOp, ExprId, ExprKind, UnaryOp};
use slate_lexer::TokenKind;
use slate_stack::ensure_sufficient_stack;

use crate::{ParseError, Parser};

/// Binary operator precedence levels, loosest first.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum BinaryLevel {
    BitOr,
    BitXor,
    BitAnd,
    Shift,
    Arith,
    Term,
}

impl BinaryLevel {
    /// The next tighter level, or `None` when operands are unary factors.
    fn tighter(self) -> Option<BinaryLevel> {
        match self {
            BinaryLevel::BitOr => Some(BinaryLevel::BitXor),
            BinaryLevel::BitXor => Some(BinaryLevel::BitAnd),
            BinaryLevel::BitAnd => Some(BinaryLevel::Shift),
            BinaryLevel::Shift => Some(BinaryLevel::Arith),
            BinaryLevel::Arith => Some(BinaryLevel::Term),
            BinaryLevel::Term => None,
        }
    }
}

impl Parser<'_> {
    /// Parse a single expression (`test` in Python grammar terms).
    ///
    /// Uses `ensure_sufficient_stack` so deeply nested input cannot
    /// overflow the native stack.
    pub(crate) fn parse_test(&mut self) -> Result<ExprId, ParseError> {
        ensure_sufficient_stack(|| self.parse_test_inner())
    }

    fn parse_test_inner(&mut self) -> Result<ExprId, ParseError> {
        if self.check(&TokenKind::Lambda) {
            return self.parse_lambda();
        }
        let body = self.parse_or_test()?;
        if !self.eat(&TokenKind::If) {
            return Ok(body);
        }
        let test = self.parse_or_test()?;
        self.expect(&TokenKind::Else)?;
        let orelse = self.parse_test()?;
        let span = self.expr_span(body).merge(self.expr_span(orelse));
        Ok(self.alloc_expr(ExprKind::IfExp { test, body, orelse }, span))
    }

    /// Comma-separated expressions; a comma makes a tuple.
    pub(crate) fn parse_testlist(&mut self) -> Result<ExprId, ParseError> {
        let start = self.current_span();
        let first = self.parse_test()?;
        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&TokenKind::Comma) {
            if !self.starts_expression() {
                break;
            }
            items.push(self.parse_test()?);
        }
        Ok(self.alloc_expr(ExprKind::Tuple(items), self.span_from(start)))
    }

    /// True if the current token can begin an expression.
    pub(crate) fn starts_expression(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::Ident(_)
                | TokenKind::Int(_)
                | TokenKind::Float(_)
                | TokenKind::Str(_)
                | TokenKind::None
                | TokenKind::True
                | TokenKind::False
                | TokenKind::LParen
                | TokenKind::LBracket
                | TokenKind::LBrace
                | TokenKind::Minus
                | TokenKind::Plus
                | TokenKind::Tilde
                | TokenKind::Not
                | TokenKind::Lambda
        )
    }

    /// `lambda params: test`
    fn parse_lambda(&mut self) -> Result<ExprId, ParseError> {
        let start = self.current_span();
        self.advance();
        let params = self.parse_params(&TokenKind::Colon)?;
        self.expect(&TokenKind::Colon)?;
        let body = self.parse_function_body(Self::parse_test)?;
        Ok(self.alloc_expr(ExprKind::Lambda { params, body }, self.span_from(start)))
    }

    /// `and_test (or and_test)*`, flattened into one node.
    pub(crate) fn parse_or_test(&mut self) -> Result<ExprId, ParseError> {
        let first = self.parse_and_test()?;
        if !self.check(&TokenKind::Or) {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.eat(&TokenKind::Or) {
            values.push(self.parse_and_test()?);
        }
        let span = self.expr_span(first).merge(self.last_end);
        Ok(self.alloc_expr(ExprKind::BoolOp { op: BoolOp::Or, values }, span))
    }

    /// `not_test (and not_test)*`
    fn parse_and_test(&mut self) -> Result<ExprId, ParseError> {
        let first = self.parse_not_test()?;
        if !self.check(&TokenKind::And) {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.eat(&TokenKind::And) {
            values.push(self.parse_not_test()?);
        }
        let span = self.expr_span(first).merge(self.last_end);
        Ok(self.alloc_expr(ExprKind::BoolOp { op: BoolOp::And, values }, span))
    }

    /// `not not_test | comparison`
    fn parse_not_test(&mut self) -> Result<ExprId, ParseError> {
        if !self.check(&TokenKind::Not) {
            return self.parse_comparison();
        }
        let start = self.current_span();
        self.advance();
        let operand = ensure_sufficient_stack(|| self.parse_not_test())?;
        let kind = ExprKind::Unary {
            op: UnaryOp::Not,
            operand,
        };
        Ok(self.alloc_expr(kind, self.span_from(start)))
    }

    /// `bitor (cmp_op bitor)*`; a chain is one node so each operand is
    /// evaluated at most once.
    fn parse_comparison(&mut self) -> Result<ExprId, ParseError> {
        let left = self.parse_bitor()?;
        let mut comparisons: Vec<(CmpOp, ExprId)> = Vec::new();
        while let Some((op, width)) = self.match_comparison_op() {
            for _ in 0..width {
                self.advance();
            }
            comparisons.push((op, self.parse_bitor()?));
        }
        if comparisons.is_empty() {
            return Ok(left);
        }
        let span = self.expr_span(left).merge(self.last_end);
        Ok(self.alloc_expr(ExprKind::Compare { left, comparisons }, span))
    }

    /// Entry to the binary operator chain.
    pub(crate) fn parse_bitor(&mut self) -> Result<ExprId, ParseError> {
        self.parse_binary_level(BinaryLevel::BitOr)
    }

    fn parse_binary_level(&mut self, level: BinaryLevel) -> Result<ExprId, ParseError> {
        let operand = |p: &mut Self| match level.tighter() {
            Some(next) => p.parse_binary_level(next),
            None => p.parse_factor(),
        };
        let mut left = operand(self)?;
        while let Some(op) = self.match_binary_op(level) {
            self.advance();
            let right = operand(self)?;
            let span = self.expr_span(left).merge(self.expr_span(right));
            left = self.alloc_expr(ExprKind::Binary { op, left, right }, span);
        }
        Ok(left)
    }

    /// `(+|-|~) factor | power`
    fn parse_factor(&mut self) -> Result<ExprId, ParseError> {
        let Some(op) = self.match_unary_op() else {
            return self.parse_power();
        };
        let start = self.current_span();
        self.advance();
        let operand = ensure_sufficient_stack(|| self.parse_factor())?;
        Ok(self.alloc_expr(ExprKind::Unary { op, operand }, self.span_from(start)))
    }

    /// `postfix [** factor]`; right associative and binds tighter than a
    /// unary minus on its left.
    fn parse_power(&mut self) -> Result<ExprId, ParseError> {
        let base = self.parse_postfix()?;
        if !self.eat(&TokenKind::DoubleStar) {
            return Ok(base);
        }
        let exponent = self.parse_factor()?;
        let span = self.expr_span(base).merge(self.expr_span(exponent));
        let kind = ExprKind::Binary {
            op: BinaryOp::Pow,
            left: base,
            right: exponent,
        };
        Ok(self.alloc_expr(kind, span))
    }
}
