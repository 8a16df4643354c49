//! Parse error type.
//!
//! Every lexical or grammatical problem surfaces as a single `ParseError`;
//! the parser stops at the first one. The evaluator records it as a
//! `SyntaxError`, so the message text is user facing.

use slate_ir::{LineIndex, SourceLocation, Span};
use slate_lexer::{LexError, TokenKind};
use thiserror::Error;

/// A syntax error with its source position.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message} (line {line}, column {column})")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
    /// 1-based line, filled in once parsing gives up.
    pub line: u32,
    /// 1-based column in characters.
    pub column: u32,
}

impl ParseError {
    #[cold]
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        ParseError {
            message: message.into(),
            span,
            line: 0,
            column: 0,
        }
    }

    /// The current token cannot start or continue the construct being parsed.
    #[cold]
    pub fn unexpected(found: &TokenKind, span: Span) -> Self {
        Self::new(format!("invalid syntax: unexpected {found}"), span)
    }

    /// A specific token or construct was required.
    #[cold]
    pub fn expected(what: &str, found: &TokenKind, span: Span) -> Self {
        Self::new(format!("expected {what}, found {found}"), span)
    }

    /// Resolve `span` to a line and column within `source`.
    #[must_use]
    pub(crate) fn located(mut self, index: &LineIndex, source: &str) -> Self {
        let location = index.locate(source, self.span.start);
        self.line = location.line;
        self.column = location.column;
        self
    }

    pub fn location(&self) -> SourceLocation {
        SourceLocation {
            line: self.line,
            column: self.column,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::new(err.to_string(), err.span)
    }
}
