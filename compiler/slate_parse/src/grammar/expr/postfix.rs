//! Postfix expressions: calls, subscripts and attribute access.

use slate_ir::{ArgKind, CallArg, ExprId, ExprKind, Name};
use slate_lexer::TokenKind;

use crate::{ParseError, Parser};

impl Parser<'_> {
    /// A primary followed by any number of `(...)`, `[...]` and `.name`.
    pub(crate) fn parse_postfix(&mut self) -> Result<ExprId, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            let start = self.expr_span(expr);
            let kind = match self.current_kind() {
                TokenKind::LParen => {
                    self.advance();
                    let args = self.parse_call_args()?;
                    ExprKind::Call { func: expr, args }
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_subscript_list()?;
                    ExprKind::Subscript { value: expr, index }
                }
                TokenKind::Dot => {
                    self.advance();
                    let attr = self.expect_ident()?;
                    ExprKind::Attribute { value: expr, attr }
                }
                _ => return Ok(expr),
            };
            expr = self.alloc_expr(kind, self.span_from(start));
        }
    }

    /// Call arguments after `(`, through the closing `)`.
    ///
    /// A lone argument followed by `for` is a generator argument and is
    /// built as a list comprehension.
    pub(crate) fn parse_call_args(&mut self) -> Result<Vec<CallArg>, ParseError> {
        let mut args: Vec<CallArg> = Vec::new();
        let mut keywords: Vec<Name> = Vec::new();
        let mut seen_keyword = false;
        let mut seen_mapping = false;

        while !self.check(&TokenKind::RParen) {
            let start = self.current_span();
            let (kind, value) = if self.eat(&TokenKind::DoubleStar) {
                seen_mapping = true;
                (ArgKind::DoubleStarred, self.parse_test()?)
            } else if self.eat(&TokenKind::Star) {
                if seen_mapping {
                    return Err(ParseError::new(
                        "iterable argument unpacking follows keyword argument unpacking",
                        start,
                    ));
                }
                (ArgKind::Starred, self.parse_test()?)
            } else if let (TokenKind::Ident(name), TokenKind::Eq) =
                (self.current_kind(), self.peek_next_kind())
            {
                let name = *name;
                self.advance();
                self.advance();
                if keywords.contains(&name) {
                    let text = self.interner.lookup(name);
                    return Err(ParseError::new(
                        format!("keyword argument repeated: {text}"),
                        start,
                    ));
                }
                keywords.push(name);
                seen_keyword = true;
                (ArgKind::Keyword(name), self.parse_test()?)
            } else {
                let mut value = self.parse_test()?;
                if self.check(&TokenKind::For) {
                    value = self.parse_list_comp(value, start)?;
                    if !args.is_empty() || !self.check(&TokenKind::RParen) {
                        return Err(ParseError::new(
                            "generator expression must be parenthesized",
                            start,
                        ));
                    }
                }
                if seen_keyword || seen_mapping {
                    return Err(ParseError::new(
                        "positional argument follows keyword argument",
                        start,
                    ));
                }
                (ArgKind::Positional, value)
            };
            args.push(CallArg {
                kind,
                value,
                span: self.span_from(start),
            });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(args)
    }

    /// Subscript contents after `[`, through the closing `]`.
    ///
    /// Several comma-separated items form a tuple index.
    fn parse_subscript_list(&mut self) -> Result<ExprId, ParseError> {
        let start = self.current_span();
        let first = self.parse_subscript_item()?;
        if !self.check(&TokenKind::Comma) {
            self.expect(&TokenKind::RBracket)?;
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&TokenKind::Comma) {
            if self.check(&TokenKind::RBracket) {
                break;
            }
            items.push(self.parse_subscript_item()?);
        }
        let span = start.merge(self.current_span());
        self.expect(&TokenKind::RBracket)?;
        Ok(self.alloc_expr(ExprKind::Tuple(items), span))
    }

    /// `test` or `[test] : [test] [: [test]]`
    fn parse_subscript_item(&mut self) -> Result<ExprId, ParseError> {
        let start = self.current_span();
        let lower = if self.check(&TokenKind::Colon) {
            None
        } else {
            Some(self.parse_test()?)
        };
        if !self.eat(&TokenKind::Colon) {
            return lower.ok_or_else(|| self.unexpected());
        }
        let upper = self.parse_slice_bound()?;
        let step = if self.eat(&TokenKind::Colon) {
            self.parse_slice_bound()?
        } else {
            None
        };
        Ok(self.alloc_expr(ExprKind::Slice { lower, upper, step }, self.span_from(start)))
    }

    fn parse_slice_bound(&mut self) -> Result<Option<ExprId>, ParseError> {
        if matches!(
            self.current_kind(),
            TokenKind::Colon | TokenKind::Comma | TokenKind::RBracket
        ) {
            Ok(None)
        } else {
            self.parse_test().map(Some)
        }
    }
}
