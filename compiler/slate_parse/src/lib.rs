//! Recursive descent parser for Slate.
//!
//! Turns source text into a [`Program`]: a statement list plus the arena
//! holding every node. The grammar is a Python-style statement language
//! with significant indentation. Constructs the evaluator refuses to run
//! (`class`, `try`, `import`, ...) are still parsed in full so malformed
//! uses of them are reported as syntax errors, then kept as `Unsupported`
//! nodes.

mod cursor;
mod error;
mod grammar;

use std::sync::Arc;

use slate_ir::{
    Expr, ExprArena, ExprId, ExprKind, LineIndex, Name, Program, Span, Stmt, StmtId, StmtKind,
    StringInterner,
};
use slate_lexer::{lex, Token, TokenKind};
use tracing::debug;

use cursor::Cursor;
pub use error::ParseError;

/// Parse `source` into a program, interning identifiers into `interner`.
pub fn parse(source: &str, interner: &StringInterner) -> Result<Program, ParseError> {
    debug!(bytes = source.len(), "parsing source");
    let parsed = lex(source, interner)
        .map_err(ParseError::from)
        .and_then(|tokens| Parser::new(&tokens, interner).parse_program());

    match parsed {
        Ok((arena, body)) => Ok(Program {
            arena: Arc::new(arena),
            body,
            source: Arc::from(source),
        }),
        Err(err) => {
            let err = err.located(&LineIndex::new(source), source);
            debug!(message = %err.message, line = err.line, "syntax error");
            Err(err)
        }
    }
}

/// Parser state.
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    interner: &'a StringInterner,
    arena: ExprArena,
    /// End of the last consumed non-layout token.
    last_end: Span,
    /// Enclosing loops in the current function body.
    loop_depth: u32,
    /// Enclosing `def`/`lambda` bodies.
    function_depth: u32,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token], interner: &'a StringInterner) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            interner,
            arena: ExprArena::new(),
            last_end: Span::DUMMY,
            loop_depth: 0,
            function_depth: 0,
        }
    }

    // Cursor delegation

    #[inline]
    fn current_kind(&self) -> &'a TokenKind {
        self.cursor.current_kind()
    }

    #[inline]
    fn current_span(&self) -> Span {
        self.cursor.current_span()
    }

    #[inline]
    fn peek_next_kind(&self) -> &'a TokenKind {
        self.cursor.peek_next_kind()
    }

    #[inline]
    fn check(&self, kind: &TokenKind) -> bool {
        self.cursor.check(kind)
    }

    fn advance(&mut self) -> &'a Token {
        let token = self.cursor.advance();
        if !matches!(
            token.kind,
            TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent | TokenKind::Eof
        ) {
            self.last_end = token.span;
        }
        token
    }

    /// Consume the current token if it matches `kind`.
    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<Span, ParseError> {
        let span = self.cursor.expect(kind)?;
        self.last_end = span;
        Ok(span)
    }

    fn expect_ident(&mut self) -> Result<Name, ParseError> {
        let span = self.current_span();
        let name = self.cursor.expect_ident()?;
        self.last_end = span;
        Ok(name)
    }

    /// Error for the current token not fitting anywhere.
    #[cold]
    fn unexpected(&self) -> ParseError {
        ParseError::unexpected(self.current_kind(), self.current_span())
    }

    /// Span from `start` through the last consumed token.
    #[inline]
    fn span_from(&self, start: Span) -> Span {
        start.merge(self.last_end)
    }

    // Arena helpers

    fn alloc_expr(&mut self, kind: ExprKind, span: Span) -> ExprId {
        self.arena.alloc_expr(Expr { kind, span })
    }

    fn alloc_stmt(&mut self, kind: StmtKind, span: Span) -> StmtId {
        self.arena.alloc_stmt(Stmt { kind, span })
    }

    #[inline]
    fn expr_span(&self, id: ExprId) -> Span {
        self.arena.expr(id).span
    }
}

#[cfg(test)]
mod tests;
