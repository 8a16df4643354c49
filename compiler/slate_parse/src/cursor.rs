//! Token cursor for navigating the token stream.
//!
//! Provides low-level token access, lookahead, and consumption methods.

use std::mem::discriminant;

use slate_ir::{Name, Span};
use slate_lexer::{Token, TokenKind};

use crate::ParseError;

/// Cursor over a lexed token slice.
///
/// The slice always ends with `Eof`, and the cursor never moves past it.
pub struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

static EOF_TOKEN: Token = Token {
    kind: TokenKind::Eof,
    span: Span::DUMMY,
};

impl<'a> Cursor<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Cursor { tokens, pos: 0 }
    }

    /// Get the current token.
    #[inline]
    pub fn current(&self) -> &'a Token {
        self.tokens.get(self.pos).unwrap_or(&EOF_TOKEN)
    }

    #[inline]
    pub fn current_kind(&self) -> &'a TokenKind {
        &self.current().kind
    }

    #[inline]
    pub fn current_span(&self) -> Span {
        self.current().span
    }

    /// Peek at the next token's kind (one-token lookahead).
    #[inline]
    pub fn peek_next_kind(&self) -> &'a TokenKind {
        self.tokens
            .get(self.pos + 1)
            .map_or(&EOF_TOKEN.kind, |token| &token.kind)
    }

    /// Check if the current token has the same variant as `kind`.
    #[inline]
    pub fn check(&self, kind: &TokenKind) -> bool {
        discriminant(self.current_kind()) == discriminant(kind)
    }

    /// Advance to the next token and return the consumed one.
    #[inline]
    pub fn advance(&mut self) -> &'a Token {
        let token = self.current();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    /// Expect a specific token kind and advance past it.
    pub fn expect(&mut self, kind: &TokenKind) -> Result<Span, ParseError> {
        if self.check(kind) {
            Ok(self.advance().span)
        } else {
            Err(ParseError::expected(
                &kind.to_string(),
                self.current_kind(),
                self.current_span(),
            ))
        }
    }

    /// Expect and consume an identifier.
    pub fn expect_ident(&mut self) -> Result<Name, ParseError> {
        if let TokenKind::Ident(name) = *self.current_kind() {
            self.advance();
            Ok(name)
        } else {
            Err(ParseError::expected(
                "identifier",
                self.current_kind(),
                self.current_span(),
            ))
        }
    }
}
