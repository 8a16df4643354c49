//! Primary expressions: literals, names, bracketed displays and
//! comprehensions.

use slate_ir::{Comprehension, ExprId, ExprKind, Span};
use slate_lexer::TokenKind;

use crate::{ParseError, Parser};

impl Parser<'_> {
    pub(crate) fn parse_primary(&mut self) -> Result<ExprId, ParseError> {
        let start = self.current_span();
        let kind = match self.current_kind() {
            TokenKind::Ident(name) => ExprKind::Ident(*name),
            TokenKind::Int(value) => ExprKind::Int(*value),
            TokenKind::Float(value) => ExprKind::Float(*value),
            TokenKind::None => ExprKind::None,
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),
            TokenKind::Str(_) => return Ok(self.parse_strings()),
            TokenKind::LParen => return self.parse_paren(),
            TokenKind::LBracket => return self.parse_list_display(),
            TokenKind::LBrace => return self.parse_brace_display(),
            _ => return Err(self.unexpected()),
        };
        self.advance();
        Ok(self.alloc_expr(kind, start))
    }

    /// One or more adjacent string literals, concatenated.
    fn parse_strings(&mut self) -> ExprId {
        let start = self.current_span();
        let mut text = String::new();
        while let TokenKind::Str(part) = self.current_kind() {
            text.push_str(part);
            self.advance();
        }
        self.alloc_expr(ExprKind::Str(text), self.span_from(start))
    }

    /// `()`, `(x)`, `(x,)`, `(a, b)` or a generator `(x for ...)`.
    fn parse_paren(&mut self) -> Result<ExprId, ParseError> {
        let start = self.current_span();
        self.advance();
        if self.eat(&TokenKind::RParen) {
            return Ok(self.alloc_expr(ExprKind::Tuple(Vec::new()), self.span_from(start)));
        }
        let first = self.parse_test()?;
        if self.check(&TokenKind::For) {
            let comp = self.parse_list_comp(first, start)?;
            self.expect(&TokenKind::RParen)?;
            return Ok(comp);
        }
        if !self.check(&TokenKind::Comma) {
            self.expect(&TokenKind::RParen)?;
            return Ok(first);
        }
        let items = self.parse_display_tail(first, &TokenKind::RParen)?;
        Ok(self.alloc_expr(ExprKind::Tuple(items), self.span_from(start)))
    }

    /// `[a, b]` or `[x for ...]`.
    fn parse_list_display(&mut self) -> Result<ExprId, ParseError> {
        let start = self.current_span();
        self.advance();
        if self.eat(&TokenKind::RBracket) {
            return Ok(self.alloc_expr(ExprKind::List(Vec::new()), self.span_from(start)));
        }
        let first = self.parse_test()?;
        if self.check(&TokenKind::For) {
            let generators = self.parse_comprehension_clauses()?;
            self.expect(&TokenKind::RBracket)?;
            let kind = ExprKind::ListComp {
                elt: first,
                generators,
            };
            return Ok(self.alloc_expr(kind, self.span_from(start)));
        }
        let items = self.parse_display_tail(first, &TokenKind::RBracket)?;
        Ok(self.alloc_expr(ExprKind::List(items), self.span_from(start)))
    }

    /// `{}`, `{k: v, ...}`, or the set and comprehension forms that are
    /// parsed but not executable.
    fn parse_brace_display(&mut self) -> Result<ExprId, ParseError> {
        let start = self.current_span();
        self.advance();
        if self.eat(&TokenKind::RBrace) {
            return Ok(self.alloc_expr(ExprKind::Dict(Vec::new()), self.span_from(start)));
        }

        let first = self.parse_test()?;
        if !self.eat(&TokenKind::Colon) {
            let construct = if self.check(&TokenKind::For) {
                self.parse_comprehension_clauses()?;
                self.expect(&TokenKind::RBrace)?;
                "set comprehension"
            } else {
                self.parse_display_tail(first, &TokenKind::RBrace)?;
                "set display"
            };
            return Ok(self.alloc_expr(ExprKind::Unsupported { construct }, self.span_from(start)));
        }

        let value = self.parse_test()?;
        if self.check(&TokenKind::For) {
            self.parse_comprehension_clauses()?;
            self.expect(&TokenKind::RBrace)?;
            let kind = ExprKind::Unsupported {
                construct: "dict comprehension",
            };
            return Ok(self.alloc_expr(kind, self.span_from(start)));
        }

        let mut entries = vec![(first, value)];
        while self.eat(&TokenKind::Comma) {
            if self.check(&TokenKind::RBrace) {
                break;
            }
            let key = self.parse_test()?;
            self.expect(&TokenKind::Colon)?;
            let value = self.parse_test()?;
            entries.push((key, value));
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(self.alloc_expr(ExprKind::Dict(entries), self.span_from(start)))
    }

    /// Remaining `, item` elements of a display after `first`, through the
    /// closing token.
    fn parse_display_tail(
        &mut self,
        first: ExprId,
        close: &TokenKind,
    ) -> Result<Vec<ExprId>, ParseError> {
        let mut items = vec![first];
        while self.eat(&TokenKind::Comma) {
            if self.check(close) {
                break;
            }
            items.push(self.parse_test()?);
        }
        self.expect(close)?;
        Ok(items)
    }

    /// Build a list comprehension for `elt` followed by `for` clauses.
    pub(crate) fn parse_list_comp(&mut self, elt: ExprId, start: Span) -> Result<ExprId, ParseError> {
        let generators = self.parse_comprehension_clauses()?;
        let kind = ExprKind::ListComp { elt, generators };
        Ok(self.alloc_expr(kind, self.span_from(start)))
    }

    /// `(for targets in or_test (if or_test)*)+`
    fn parse_comprehension_clauses(&mut self) -> Result<Vec<Comprehension>, ParseError> {
        let mut generators = Vec::new();
        while self.eat(&TokenKind::For) {
            let target = self.parse_target_list()?;
            self.expect(&TokenKind::In)?;
            let iter = self.parse_or_test()?;
            let mut ifs = Vec::new();
            while self.eat(&TokenKind::If) {
                ifs.push(self.parse_or_test()?);
            }
            generators.push(Comprehension { target, iter, ifs });
        }
        Ok(generators)
    }
}
