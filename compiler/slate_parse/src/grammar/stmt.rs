//! Statement parsing.

use slate_ir::{ExprArena, ExprKind, FunctionDef, Name, StmtId, StmtKind};
use slate_lexer::TokenKind;

use super::targets::TargetContext;
use crate::{ParseError, Parser};

impl Parser<'_> {
    /// Parse the whole token stream.
    pub(crate) fn parse_program(mut self) -> Result<(ExprArena, Vec<StmtId>), ParseError> {
        let mut body = Vec::new();
        loop {
            match self.current_kind() {
                TokenKind::Eof => break,
                TokenKind::Newline => {
                    self.advance();
                }
                TokenKind::Indent => {
                    return Err(ParseError::new("unexpected indent", self.current_span()));
                }
                _ => self.parse_statement(&mut body)?,
            }
        }
        Ok((self.arena, body))
    }

    /// Parse one statement line (or compound statement) into `out`.
    ///
    /// A line of `;`-separated simple statements contributes several.
    fn parse_statement(&mut self, out: &mut Vec<StmtId>) -> Result<(), ParseError> {
        let stmt = match self.current_kind() {
            TokenKind::If => self.parse_if()?,
            TokenKind::While => self.parse_while()?,
            TokenKind::For => self.parse_for()?,
            TokenKind::Def => self.parse_function_def()?,
            TokenKind::Class => self.parse_class()?,
            TokenKind::Try => self.parse_try()?,
            TokenKind::With => self.parse_with()?,
            TokenKind::Async => {
                return Err(ParseError::new(
                    "`async` statements are not supported",
                    self.current_span(),
                ))
            }
            _ => return self.parse_simple_statements(out),
        };
        out.push(stmt);
        Ok(())
    }

    fn parse_simple_statements(&mut self, out: &mut Vec<StmtId>) -> Result<(), ParseError> {
        loop {
            out.push(self.parse_simple_statement()?);
            if !self.eat(&TokenKind::Semi) || self.at_line_end() {
                break;
            }
        }
        match self.current_kind() {
            TokenKind::Newline => {
                self.advance();
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            _ => Err(self.unexpected()),
        }
    }

    #[inline]
    fn at_line_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Newline | TokenKind::Eof)
    }

    /// True where a simple statement may end.
    #[inline]
    pub(crate) fn at_statement_end(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::Newline | TokenKind::Semi | TokenKind::Eof
        )
    }

    /// Parse `: suite`, where the suite is either an indented block or
    /// simple statements on the same line.
    pub(crate) fn parse_block(&mut self) -> Result<Vec<StmtId>, ParseError> {
        self.expect(&TokenKind::Colon)?;
        let mut body = Vec::new();
        if !self.eat(&TokenKind::Newline) {
            self.parse_simple_statements(&mut body)?;
            return Ok(body);
        }
        if !self.eat(&TokenKind::Indent) {
            return Err(ParseError::new(
                "expected an indented block",
                self.current_span(),
            ));
        }
        loop {
            match self.current_kind() {
                TokenKind::Dedent => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => break,
                TokenKind::Newline => {
                    self.advance();
                }
                TokenKind::Indent => {
                    return Err(ParseError::new("unexpected indent", self.current_span()));
                }
                _ => self.parse_statement(&mut body)?,
            }
        }
        Ok(body)
    }

    /// Parse a block that is the body of a loop.
    fn parse_loop_body(&mut self) -> Result<Vec<StmtId>, ParseError> {
        self.loop_depth += 1;
        let body = self.parse_block();
        self.loop_depth -= 1;
        body
    }

    // Simple statements

    fn parse_simple_statement(&mut self) -> Result<StmtId, ParseError> {
        let start = self.current_span();
        let kind = match self.current_kind() {
            TokenKind::Pass => {
                self.advance();
                StmtKind::Pass
            }
            TokenKind::Break => {
                if self.loop_depth == 0 {
                    return Err(ParseError::new("'break' outside loop", start));
                }
                self.advance();
                StmtKind::Break
            }
            TokenKind::Continue => {
                if self.loop_depth == 0 {
                    return Err(ParseError::new("'continue' not properly in loop", start));
                }
                self.advance();
                StmtKind::Continue
            }
            TokenKind::Return => {
                if self.function_depth == 0 {
                    return Err(ParseError::new("'return' outside function", start));
                }
                self.advance();
                if self.at_statement_end() {
                    StmtKind::Return(None)
                } else {
                    StmtKind::Return(Some(self.parse_testlist()?))
                }
            }
            TokenKind::Global => {
                self.advance();
                StmtKind::Global(self.parse_name_list()?)
            }
            TokenKind::Del => {
                self.advance();
                self.parse_delete()?
            }
            TokenKind::Print => self.parse_print()?,
            TokenKind::Import
            | TokenKind::From
            | TokenKind::Raise
            | TokenKind::Assert
            | TokenKind::Nonlocal
            | TokenKind::Yield => self.parse_unsupported_simple()?,
            _ => return self.parse_expression_statement(),
        };
        Ok(self.alloc_stmt(kind, self.span_from(start)))
    }

    /// `name (, name)*`
    pub(crate) fn parse_name_list(&mut self) -> Result<Vec<Name>, ParseError> {
        let mut names = vec![self.expect_ident()?];
        while self.eat(&TokenKind::Comma) {
            names.push(self.expect_ident()?);
        }
        Ok(names)
    }

    fn parse_delete(&mut self) -> Result<StmtKind, ParseError> {
        let mut targets = vec![self.parse_target_operand()?];
        while self.eat(&TokenKind::Comma) {
            if self.at_statement_end() {
                break;
            }
            targets.push(self.parse_target_operand()?);
        }
        for &target in &targets {
            self.validate_target(target, TargetContext::Delete)?;
        }
        Ok(StmtKind::Delete(targets))
    }

    /// `print`, `print a, b`, `print a,` or `print(a, b)`.
    fn parse_print(&mut self) -> Result<StmtKind, ParseError> {
        self.advance();
        if self.at_statement_end() {
            return Ok(StmtKind::Print {
                values: Vec::new(),
                newline: true,
            });
        }

        if self.eat(&TokenKind::LParen) {
            let mut values = Vec::new();
            while !self.check(&TokenKind::RParen) {
                if matches!(self.current_kind(), TokenKind::Ident(_))
                    && matches!(self.peek_next_kind(), TokenKind::Eq)
                {
                    return Err(ParseError::new(
                        "keyword arguments to print are not supported",
                        self.current_span(),
                    ));
                }
                values.push(self.parse_test()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::RParen)?;
            if !self.at_statement_end() {
                return Err(self.unexpected());
            }
            return Ok(StmtKind::Print {
                values,
                newline: true,
            });
        }

        let mut values = vec![self.parse_test()?];
        let mut newline = true;
        while self.eat(&TokenKind::Comma) {
            if self.at_statement_end() {
                newline = false;
                break;
            }
            values.push(self.parse_test()?);
        }
        Ok(StmtKind::Print { values, newline })
    }

    /// Expression statement, (chained) assignment or augmented assignment.
    fn parse_expression_statement(&mut self) -> Result<StmtId, ParseError> {
        let start = self.current_span();
        let first = self.parse_testlist()?;

        if let Some(op) = self.match_augmented_op() {
            self.validate_target(first, TargetContext::AugAssign)?;
            self.advance();
            let value = self.parse_testlist()?;
            let kind = StmtKind::AugAssign {
                target: first,
                op,
                value,
            };
            return Ok(self.alloc_stmt(kind, self.span_from(start)));
        }

        if !self.check(&TokenKind::Eq) {
            return Ok(self.alloc_stmt(StmtKind::Expr(first), self.span_from(start)));
        }

        let mut targets = vec![first];
        while self.eat(&TokenKind::Eq) {
            targets.push(self.parse_testlist()?);
        }
        let value = targets.pop().unwrap_or(first);
        for &target in &targets {
            self.validate_target(target, TargetContext::Assign)?;
        }
        Ok(self.alloc_stmt(StmtKind::Assign { targets, value }, self.span_from(start)))
    }

    // Compound statements

    /// `if test: block (elif test: block)* [else: block]`
    ///
    /// `elif` chains become nested `If` nodes in `orelse`.
    fn parse_if(&mut self) -> Result<StmtId, ParseError> {
        let start = self.current_span();
        self.advance(); // `if` or `elif`
        let test = self.parse_test()?;
        let body = self.parse_block()?;
        let orelse = match self.current_kind() {
            TokenKind::Elif => vec![self.parse_if()?],
            TokenKind::Else => {
                self.advance();
                self.parse_block()?
            }
            _ => Vec::new(),
        };
        Ok(self.alloc_stmt(StmtKind::If { test, body, orelse }, self.span_from(start)))
    }

    fn parse_while(&mut self) -> Result<StmtId, ParseError> {
        let start = self.current_span();
        self.advance();
        let test = self.parse_test()?;
        let body = self.parse_loop_body()?;
        let orelse = self.parse_else_block()?;
        Ok(self.alloc_stmt(StmtKind::While { test, body, orelse }, self.span_from(start)))
    }

    fn parse_for(&mut self) -> Result<StmtId, ParseError> {
        let start = self.current_span();
        self.advance();
        let target = self.parse_target_list()?;
        self.expect(&TokenKind::In)?;
        let iter = self.parse_testlist()?;
        let body = self.parse_loop_body()?;
        let orelse = self.parse_else_block()?;
        let kind = StmtKind::For {
            target,
            iter,
            body,
            orelse,
        };
        Ok(self.alloc_stmt(kind, self.span_from(start)))
    }

    fn parse_else_block(&mut self) -> Result<Vec<StmtId>, ParseError> {
        if self.eat(&TokenKind::Else) {
            self.parse_block()
        } else {
            Ok(Vec::new())
        }
    }

    /// `def name(params) [-> test]: block`
    fn parse_function_def(&mut self) -> Result<StmtId, ParseError> {
        let start = self.current_span();
        self.advance();
        let name = self.expect_ident()?;
        self.expect(&TokenKind::LParen)?;
        let params = self.parse_params(&TokenKind::RParen)?;
        self.expect(&TokenKind::RParen)?;
        if self.eat(&TokenKind::Arrow) {
            // Return annotations are accepted and ignored.
            self.parse_test()?;
        }
        let body = self.parse_function_body(Self::parse_block)?;
        let doc = self.docstring(&body);
        let def = FunctionDef {
            name,
            params,
            body,
            doc,
        };
        Ok(self.alloc_stmt(StmtKind::FunctionDef(def), self.span_from(start)))
    }

    /// Run `body` as a function body: loops outside it do not count and
    /// `return` becomes legal.
    pub(crate) fn parse_function_body<T>(
        &mut self,
        body: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let saved_loops = std::mem::replace(&mut self.loop_depth, 0);
        self.function_depth += 1;
        let result = body(self);
        self.function_depth -= 1;
        self.loop_depth = saved_loops;
        result
    }

    /// Leading string literal of a function body.
    fn docstring(&self, body: &[StmtId]) -> Option<String> {
        let first = self.arena.stmt(*body.first()?);
        let StmtKind::Expr(expr) = first.kind else {
            return None;
        };
        match &self.arena.expr(expr).kind {
            ExprKind::Str(text) => Some(text.clone()),
            _ => None,
        }
    }
}
