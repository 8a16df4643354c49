//! Lexer error types.
//!
//! A `LexError` pairs a `LexErrorKind` with the span it occurred at. The
//! parser lifts these into syntax errors, so the `Display` text is what the
//! user ends up reading.

use slate_ir::Span;
use thiserror::Error;

/// A lexer error with its source span.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct LexError {
    pub span: Span,
    pub kind: LexErrorKind,
}

/// What kind of lexer error occurred.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    #[error("invalid character `{0}` in source")]
    InvalidCharacter(char),
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("integer literal `{0}` is too large")]
    IntOverflow(String),
    #[error("invalid numeric literal `{0}`")]
    InvalidNumber(String),
    #[error("invalid escape sequence `\\{0}`")]
    InvalidEscape(String),
    #[error("unindent does not match any outer indentation level")]
    InconsistentDedent,
}

impl LexError {
    #[cold]
    pub fn invalid_character(span: Span, c: char) -> Self {
        LexError {
            span,
            kind: LexErrorKind::InvalidCharacter(c),
        }
    }

    #[cold]
    pub fn unterminated_string(span: Span) -> Self {
        LexError {
            span,
            kind: LexErrorKind::UnterminatedString,
        }
    }

    #[cold]
    pub fn int_overflow(span: Span, text: &str) -> Self {
        LexError {
            span,
            kind: LexErrorKind::IntOverflow(text.to_string()),
        }
    }

    #[cold]
    pub fn invalid_number(span: Span, text: &str) -> Self {
        LexError {
            span,
            kind: LexErrorKind::InvalidNumber(text.to_string()),
        }
    }

    #[cold]
    pub fn invalid_escape(span: Span, escape: &str) -> Self {
        LexError {
            span,
            kind: LexErrorKind::InvalidEscape(escape.to_string()),
        }
    }

    #[cold]
    pub fn inconsistent_dedent(span: Span) -> Self {
        LexError {
            span,
            kind: LexErrorKind::InconsistentDedent,
        }
    }
}
