//! Statements the evaluator refuses to run.
//!
//! Each is parsed with its full shape so that misuse (`class = 1`,
//! `raise = 1`, a `try` with no handler) is a syntax error, and the result
//! is an `Unsupported` statement naming the construct.

use slate_ir::{Span, StmtId, StmtKind};
use slate_lexer::TokenKind;

use crate::{ParseError, Parser};

impl Parser<'_> {
    /// `class Name[(bases)]: block`
    pub(crate) fn parse_class(&mut self) -> Result<StmtId, ParseError> {
        let start = self.current_span();
        self.advance();
        self.expect_ident()?;
        if self.eat(&TokenKind::LParen) {
            self.parse_call_args()?;
        }
        let saved_loops = std::mem::replace(&mut self.loop_depth, 0);
        let body = self.parse_block();
        self.loop_depth = saved_loops;
        body?;
        Ok(self.unsupported_stmt("class", start))
    }

    /// `try: block (except [test [as name]]: block)* [else: block] [finally: block]`
    pub(crate) fn parse_try(&mut self) -> Result<StmtId, ParseError> {
        let start = self.current_span();
        self.advance();
        self.parse_block()?;

        let mut handlers = 0usize;
        while self.eat(&TokenKind::Except) {
            if !self.check(&TokenKind::Colon) {
                self.parse_test()?;
                if self.eat(&TokenKind::As) {
                    self.expect_ident()?;
                }
            }
            self.parse_block()?;
            handlers += 1;
        }
        if handlers > 0 && self.eat(&TokenKind::Else) {
            self.parse_block()?;
        }
        let has_finally = self.eat(&TokenKind::Finally);
        if has_finally {
            self.parse_block()?;
        }
        if handlers == 0 && !has_finally {
            return Err(ParseError::expected(
                "`except` or `finally`",
                self.current_kind(),
                self.current_span(),
            ));
        }
        Ok(self.unsupported_stmt("try", start))
    }

    /// `with test [as target] (, test [as target])*: block`
    pub(crate) fn parse_with(&mut self) -> Result<StmtId, ParseError> {
        let start = self.current_span();
        self.advance();
        loop {
            self.parse_test()?;
            if self.eat(&TokenKind::As) {
                self.parse_target_list()?;
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.parse_block()?;
        Ok(self.unsupported_stmt("with", start))
    }

    /// `import`, `from ... import`, `raise`, `assert`, `nonlocal`, `yield`.
    pub(crate) fn parse_unsupported_simple(&mut self) -> Result<StmtKind, ParseError> {
        let start = self.current_span();
        let construct = match self.advance().kind {
            TokenKind::Import => {
                self.parse_import_names()?;
                "import"
            }
            TokenKind::From => {
                self.parse_from_import()?;
                "import"
            }
            TokenKind::Raise => {
                if !self.at_statement_end() {
                    self.parse_test()?;
                    if self.eat(&TokenKind::From) {
                        self.parse_test()?;
                    }
                }
                "raise"
            }
            TokenKind::Assert => {
                self.parse_test()?;
                if self.eat(&TokenKind::Comma) {
                    self.parse_test()?;
                }
                "assert"
            }
            TokenKind::Nonlocal => {
                self.parse_name_list()?;
                "nonlocal"
            }
            TokenKind::Yield => {
                if self.function_depth == 0 {
                    return Err(ParseError::new("'yield' outside function", start));
                }
                if !self.at_statement_end() {
                    self.parse_testlist()?;
                }
                "yield"
            }
            _ => return Err(ParseError::new("invalid syntax", start)),
        };
        Ok(StmtKind::Unsupported { construct })
    }

    /// `dotted [as name] (, dotted [as name])*`
    fn parse_import_names(&mut self) -> Result<(), ParseError> {
        loop {
            self.parse_dotted_name()?;
            if self.eat(&TokenKind::As) {
                self.expect_ident()?;
            }
            if !self.eat(&TokenKind::Comma) {
                return Ok(());
            }
        }
    }

    /// `from .*dotted import (* | names | (names))`
    fn parse_from_import(&mut self) -> Result<(), ParseError> {
        let mut relative = false;
        while self.eat(&TokenKind::Dot) {
            relative = true;
        }
        if !relative || !self.check(&TokenKind::Import) {
            self.parse_dotted_name()?;
        }
        self.expect(&TokenKind::Import)?;
        if self.eat(&TokenKind::Star) {
            return Ok(());
        }
        let parenthesized = self.eat(&TokenKind::LParen);
        loop {
            self.expect_ident()?;
            if self.eat(&TokenKind::As) {
                self.expect_ident()?;
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
            if parenthesized && self.check(&TokenKind::RParen) {
                break;
            }
        }
        if parenthesized {
            self.expect(&TokenKind::RParen)?;
        }
        Ok(())
    }

    fn parse_dotted_name(&mut self) -> Result<(), ParseError> {
        self.expect_ident()?;
        while self.eat(&TokenKind::Dot) {
            self.expect_ident()?;
        }
        Ok(())
    }

    fn unsupported_stmt(&mut self, construct: &'static str, start: Span) -> StmtId {
        let span = self.span_from(start);
        self.alloc_stmt(StmtKind::Unsupported { construct }, span)
    }
}
